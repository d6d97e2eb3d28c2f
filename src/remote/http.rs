use async_trait::async_trait;
use reqwest::{Client, IntoUrl, Response, Url};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::core::state::Credentials;
use crate::remote::types::{
    AuthRequest, AuthResponse, LikeResponse, RawMatch, RawRecommendation, RecsResponse,
    UpdatesResponse,
};
use crate::remote::{RemoteClient, RemoteError};

const AUTH_HEADER: &str = "X-Auth-Token";

/// JSON-over-HTTP client for the remote dating API.
pub struct HttpRemote {
    base_url: String,
    credentials: Credentials,
    client: Client,
    api_token: RwLock<Option<String>>,
}

impl HttpRemote {
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kindling/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            client,
            api_token: RwLock::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `{base}/{action}/{id}` with the id percent-encoded as a single segment.
    fn item_url(&self, action: &str, id: &str) -> Result<Url, RemoteError> {
        if matches!(id, "" | "." | "..") {
            return Err(RemoteError::Decode(format!("unusable recommendation id {:?}", id)));
        }
        let mut url =
            Url::parse(&self.url(action)).map_err(|e| RemoteError::Network(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::Network(format!("{} cannot carry a path", self.base_url)))?
            .push(id);
        Ok(url)
    }

    async fn token(&self) -> Result<String, RemoteError> {
        self.api_token
            .read()
            .await
            .clone()
            .ok_or_else(|| RemoteError::Auth("not authenticated".to_string()))
    }

    async fn get(&self, url: impl IntoUrl) -> Result<Response, RemoteError> {
        let token = self.token().await?;
        let res = self.client.get(url).header(AUTH_HEADER, token).send().await?;
        ensure_success(res).await
    }

    async fn post(&self, path: &str, payload: &serde_json::Value) -> Result<Response, RemoteError> {
        let token = self.token().await?;
        let res = self
            .client
            .post(self.url(path))
            .header(AUTH_HEADER, token)
            .json(payload)
            .send()
            .await?;
        ensure_success(res).await
    }
}

async fn ensure_success(res: Response) -> Result<Response, RemoteError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(RemoteError::from_status(status.as_u16(), &body))
}

/// Turns a decoded `/user/recs` body into the deck or its sentinel.
pub fn recommendations_from(resp: RecsResponse) -> Result<Vec<RawRecommendation>, RemoteError> {
    if let Some(results) = resp.results {
        return Ok(results);
    }
    match resp.message.as_deref() {
        Some(message) => Err(RemoteError::from_recs_message(message)
            .unwrap_or_else(|| RemoteError::Decode(message.to_string()))),
        None => Ok(Vec::new()),
    }
}

#[async_trait]
impl RemoteClient for HttpRemote {
    async fn authenticate(&self) -> Result<(), RemoteError> {
        let payload = AuthRequest {
            facebook_id: self.credentials.account_id.clone(),
            facebook_token: self.credentials.access_token.clone(),
        };
        let res = self.client.post(self.url("auth")).json(&payload).send().await?;
        let res = ensure_success(res).await?;
        let auth: AuthResponse = res.json().await?;
        let token = auth
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RemoteError::Auth("login returned no token".to_string()))?;
        *self.api_token.write().await = Some(token);
        info!(account = %self.credentials.account_id, "authenticated against {}", self.base_url);
        Ok(())
    }

    async fn fetch_updates(&self) -> Result<UpdatesResponse, RemoteError> {
        let res = self.post("updates", &serde_json::json!({})).await?;
        Ok(res.json().await?)
    }

    async fn fetch_recommendations(&self) -> Result<Vec<RawRecommendation>, RemoteError> {
        let res = self.get(self.url("user/recs")).await?;
        let resp: RecsResponse = res.json().await?;
        recommendations_from(resp)
    }

    async fn like(&self, recommendation_id: &str) -> Result<Option<RawMatch>, RemoteError> {
        let res = self.get(self.item_url("like", recommendation_id)?).await?;
        let resp: LikeResponse = res.json().await?;
        if let Some(left) = resp.likes_remaining {
            debug!(likes_remaining = left, "like accepted");
        }
        Ok(resp.into_match())
    }

    async fn pass(&self, recommendation_id: &str) -> Result<(), RemoteError> {
        self.get(self.item_url("pass", recommendation_id)?).await?;
        Ok(())
    }
}
