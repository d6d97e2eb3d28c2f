use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::remote::{RawMatch, RawMessage, RawPerson, RawRecommendation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub bio: String,
    pub birth: String,
    pub gender: i32,
    pub name: String,
    pub ping_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub match_id: String,
    pub timestamp: i64,
    pub to: String,
    pub from: String,
    pub message: String,
    pub sent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub common_friend_count: u32,
    pub common_like_count: u32,
    pub message_count: u32,
    /// Chronological.
    pub messages: Vec<Message>,
    pub person: Person,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub name: String,
    pub distance_mi: u32,
    pub bio: String,
    pub birth_date: Option<String>,
}

impl From<RawPerson> for Person {
    fn from(raw: RawPerson) -> Self {
        Self {
            id: raw.id,
            bio: raw.bio,
            birth: raw.birth,
            gender: raw.gender,
            name: raw.name,
            ping_time: raw.ping_time,
        }
    }
}

impl From<RawMessage> for Message {
    fn from(raw: RawMessage) -> Self {
        Self {
            id: raw.id,
            match_id: raw.match_id,
            timestamp: raw.timestamp,
            to: raw.to,
            from: raw.from,
            message: raw.message,
            sent: raw.sent,
        }
    }
}

impl From<RawMatch> for Match {
    fn from(raw: RawMatch) -> Self {
        Self {
            id: raw.id,
            common_friend_count: raw.common_friend_count,
            common_like_count: raw.common_like_count,
            message_count: raw.message_count,
            messages: raw.messages.into_iter().map(Message::from).collect(),
            person: raw.person.into(),
        }
    }
}

impl From<RawRecommendation> for Recommendation {
    fn from(raw: RawRecommendation) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            distance_mi: raw.distance_mi,
            bio: raw.bio,
            birth_date: raw.birth_date,
        }
    }
}

impl Recommendation {
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.birth_date.as_deref().and_then(|b| age_on(b, today))
    }
}

/// Whole years between a remote birth date and `today`.
///
/// Accepts RFC 3339 timestamps as well as bare `YYYY-MM-DD` dates.
pub fn age_on(birth: &str, today: NaiveDate) -> Option<u32> {
    let born = parse_date(birth)?;
    let mut years = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Coarse "last active" label for a remote ping time.
pub fn last_active(ping_time: &str, now: DateTime<Utc>) -> Option<String> {
    let seen = DateTime::parse_from_rfc3339(ping_time).ok()?.with_timezone(&Utc);
    let elapsed = now.signed_duration_since(seen);
    let label = if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}d ago", elapsed.num_days())
    };
    Some(label)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}
