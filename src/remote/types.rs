use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- Auth ---

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthRequest {
    pub facebook_id: String,
    pub facebook_token: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthResponse {
    pub token: Option<String>,
}

// --- Updates ---

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct UpdatesResponse {
    #[serde(default)]
    pub matches: Vec<RawMatch>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RawMatch {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub common_friend_count: u32,
    #[serde(default)]
    pub common_like_count: u32,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default)]
    pub messages: Vec<RawMessage>,
    #[serde(default)]
    pub person: RawPerson,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RawMessage {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub match_id: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "sent_date")]
    pub sent: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RawPerson {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default, rename = "birth_date")]
    pub birth: String,
    #[serde(default)]
    pub gender: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ping_time: String,
}

// --- Recommendations ---

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RawRecommendation {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub distance_mi: u32,
    #[serde(default)]
    pub bio: String,
    pub birth_date: Option<String>,
}

/// `/user/recs` body. On an empty deck the remote answers with a `message`
/// instead of `results`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RecsResponse {
    pub status: Option<u16>,
    pub message: Option<String>,
    pub results: Option<Vec<RawRecommendation>>,
}

// --- Swipes ---

/// `/like/{id}` body. `match` is `false` unless the like closed a match.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct LikeResponse {
    #[serde(rename = "match", default)]
    pub matched: Value,
    pub likes_remaining: Option<u32>,
}

impl LikeResponse {
    pub fn into_match(self) -> Option<RawMatch> {
        match self.matched {
            Value::Object(_) => serde_json::from_value(self.matched).ok(),
            _ => None,
        }
    }
}
