use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use super::model::{Match, Recommendation};

/// Matches plus the pending recommendation deck.
///
/// Only reachable through [`ProfileStore::exclusive`], so every read and
/// write happens inside one critical section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    matches: Vec<Match>,
    recommendations: VecDeque<Recommendation>,
}

impl Profile {
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn recommendations(&self) -> impl Iterator<Item = &Recommendation> {
        self.recommendations.iter()
    }

    pub fn queue_len(&self) -> usize {
        self.recommendations.len()
    }

    pub fn is_queue_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    pub fn head(&self) -> Option<&Recommendation> {
        self.recommendations.front()
    }

    /// Swaps in a complete refresh; matches are never merged.
    pub fn replace_matches(&mut self, matches: Vec<Match>) {
        self.matches = matches;
    }

    /// Refills the deck in response order. A non-empty deck is left alone;
    /// returns how many recommendations were added.
    pub fn refill_recommendations<I>(&mut self, recs: I) -> usize
    where
        I: IntoIterator<Item = Recommendation>,
    {
        if !self.recommendations.is_empty() {
            return 0;
        }
        self.recommendations.extend(recs);
        self.recommendations.len()
    }

    /// Consumes the head; once popped a recommendation never comes back.
    pub fn pop_head(&mut self) -> Option<Recommendation> {
        self.recommendations.pop_front()
    }
}

pub type ProfileGuard<'a> = MutexGuard<'a, Profile>;

/// Shared handle to the single mutable profile.
#[derive(Clone, Default)]
pub struct ProfileStore {
    inner: Arc<Mutex<Profile>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive read-write access until the guard drops.
    pub async fn exclusive(&self) -> ProfileGuard<'_> {
        self.inner.lock().await
    }

    pub async fn snapshot(&self) -> Profile {
        self.exclusive().await.clone()
    }

    #[cfg(test)]
    pub(crate) fn inner_is_locked(&self) -> bool {
        self.inner.try_lock().is_err()
    }

    /// Copies out what a frame needs and releases the lock immediately.
    pub async fn view(&self, match_limit: usize) -> ProfileView {
        let profile = self.exclusive().await;
        ProfileView::of(&profile, match_limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSummary {
    pub name: String,
    pub message_count: u32,
    pub last_message: Option<String>,
    /// Raw remote ping time; turned into a "last active" label when drawn.
    pub ping_time: String,
}

/// Render-side copy of the profile. `top == None` is the "no one new" state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileView {
    pub top: Option<Recommendation>,
    pub queue_len: usize,
    pub match_count: usize,
    pub matches: Vec<MatchSummary>,
}

impl ProfileView {
    pub fn of(profile: &Profile, match_limit: usize) -> Self {
        Self {
            top: profile.head().cloned(),
            queue_len: profile.queue_len(),
            match_count: profile.matches().len(),
            matches: profile
                .matches()
                .iter()
                .take(match_limit)
                .map(|m| MatchSummary {
                    name: m.person.name.clone(),
                    message_count: m.message_count,
                    last_message: m.messages.last().map(|msg| msg.message.clone()),
                    ping_time: m.person.ping_time.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::mock::{raw_match, raw_rec};

    fn recs(ids: &[&str]) -> Vec<Recommendation> {
        ids.iter().map(|id| Recommendation::from(raw_rec(id))).collect()
    }

    #[test]
    fn test_refill_only_when_empty() {
        let mut profile = Profile::default();
        assert_eq!(profile.refill_recommendations(recs(&["a", "b"])), 2);
        assert_eq!(profile.refill_recommendations(recs(&["c"])), 0);

        let ids: Vec<&str> = profile.recommendations().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_pop_is_fifo_and_final() {
        let mut profile = Profile::default();
        profile.refill_recommendations(recs(&["a", "b", "c"]));

        assert_eq!(profile.pop_head().unwrap().id, "a");
        assert_eq!(profile.head().unwrap().id, "b");
        assert!(profile.recommendations().all(|r| r.id != "a"));
        assert_eq!(profile.pop_head().unwrap().id, "b");
        assert_eq!(profile.pop_head().unwrap().id, "c");
        assert!(profile.pop_head().is_none());
        assert!(profile.is_queue_empty());
    }

    #[test]
    fn test_view_copies_render_fields() {
        let mut profile = Profile::default();
        profile.replace_matches(vec![
            Match::from(raw_match("m1", "Ada", 2)),
            Match::from(raw_match("m2", "Bo", 0)),
            Match::from(raw_match("m3", "Cy", 1)),
        ]);
        profile.refill_recommendations(recs(&["a", "b"]));

        let view = ProfileView::of(&profile, 2);
        assert_eq!(view.top.as_ref().map(|r| r.id.as_str()), Some("a"));
        assert_eq!(view.queue_len, 2);
        assert_eq!(view.match_count, 3);
        assert_eq!(view.matches.len(), 2);
        assert_eq!(view.matches[0].last_message.as_deref(), Some("message 1"));
        assert_eq!(view.matches[1].last_message, None);
        assert_eq!(view.matches[0].ping_time, "2023-11-14T22:00:00.000Z");
    }

    #[test]
    fn test_empty_view_is_no_one_new() {
        let view = ProfileView::of(&Profile::default(), 10);
        assert!(view.top.is_none());
        assert_eq!(view.queue_len, 0);
    }

    #[tokio::test]
    async fn test_store_handles_share_one_profile() {
        let store = ProfileStore::new();
        let other = store.clone();
        {
            let mut profile = store.exclusive().await;
            profile.refill_recommendations(recs(&["a"]));
        }
        assert_eq!(other.snapshot().await.queue_len(), 1);
        assert_eq!(other.view(5).await.top.unwrap().id, "a");
    }
}
