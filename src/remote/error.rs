use std::fmt;

const MAX_BODY_CHARS: usize = 200;

/// Failure of a call against the remote API.
///
/// `RecsExhausted` and `RecsTimeout` are not faults: they mean the remote has
/// nobody new to offer right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// 401/403 or a login that returned no token.
    Auth(String),
    /// Connection refused, DNS failure, reset, etc.
    Network(String),
    /// Any other non-success status.
    Status { status: u16, body: String },
    /// Body did not match the expected shape.
    Decode(String),
    /// The call exceeded its time budget.
    Timeout,
    RecsExhausted,
    RecsTimeout,
}

impl RemoteError {
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => RemoteError::Auth(truncate_body(body)),
            408 => RemoteError::Timeout,
            _ => RemoteError::Status {
                status,
                body: truncate_body(body),
            },
        }
    }

    /// Maps the `message` of an empty recommendations response to its sentinel.
    pub fn from_recs_message(message: &str) -> Option<Self> {
        let lowered = message.to_ascii_lowercase();
        if lowered.contains("recs exhausted") {
            Some(RemoteError::RecsExhausted)
        } else if lowered.contains("recs timeout") {
            Some(RemoteError::RecsTimeout)
        } else {
            None
        }
    }

    pub fn is_recs_sentinel(&self) -> bool {
        matches!(self, RemoteError::RecsExhausted | RemoteError::RecsTimeout)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Auth(msg) => write!(f, "authentication rejected: {}", msg),
            RemoteError::Network(msg) => write!(f, "network error: {}", msg),
            RemoteError::Status { status, body } => {
                write!(f, "remote returned {}: {}", status, body)
            }
            RemoteError::Decode(msg) => write!(f, "unexpected response: {}", msg),
            RemoteError::Timeout => write!(f, "request timed out"),
            RemoteError::RecsExhausted => write!(f, "recommendations exhausted"),
            RemoteError::RecsTimeout => write!(f, "recommendations request timed out"),
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            RemoteError::from_status(status.as_u16(), &err.to_string())
        } else {
            RemoteError::Network(err.to_string())
        }
    }
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_BODY_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX_BODY_CHARS).collect();
    format!("{}...", cut)
}
