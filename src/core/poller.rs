use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::bus::RedrawSignal;
use super::model::{Match, Recommendation};
use super::profile::ProfileStore;
use super::state::AppState;
use crate::remote::{with_timeout, RemoteClient};

/// What one poll cycle changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    pub matches_refreshed: bool,
    pub recommendations_requested: bool,
    pub recommendations_added: usize,
    pub failures: usize,
}

/// Periodically refreshes the profile from the remote.
pub struct Poller {
    store: ProfileStore,
    remote: Arc<dyn RemoteClient>,
    redraw: RedrawSignal,
    interval: Duration,
    timeout: Duration,
}

impl Poller {
    pub fn new(
        store: ProfileStore,
        remote: Arc<dyn RemoteClient>,
        redraw: RedrawSignal,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            remote,
            redraw,
            interval,
            timeout,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.store.clone(),
            state.remote.clone(),
            state.redraw.clone(),
            state.config.poll_interval(),
            state.config.remote_timeout(),
        )
    }

    /// Runs until the task is aborted. The first cycle fires immediately.
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "poller started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let report = self.poll_once().await;
            debug!(?report, "poll cycle finished");
        }
    }

    /// One refresh cycle. The lock is held from the first remote call until
    /// the profile is consistent again; the redraw goes out after release.
    pub async fn poll_once(&self) -> PollReport {
        let mut report = PollReport::default();
        {
            let mut profile = self.store.exclusive().await;

            match with_timeout(self.timeout, self.remote.fetch_updates()).await {
                Ok(updates) => {
                    let matches: Vec<Match> =
                        updates.matches.into_iter().map(Match::from).collect();
                    debug!(count = matches.len(), "matches refreshed");
                    profile.replace_matches(matches);
                    report.matches_refreshed = true;
                }
                Err(e) => {
                    warn!("Error polling updates: {}", e);
                    report.failures += 1;
                }
            }

            if profile.is_queue_empty() {
                report.recommendations_requested = true;
                match with_timeout(self.timeout, self.remote.fetch_recommendations()).await {
                    Ok(recs) => {
                        let added = profile
                            .refill_recommendations(recs.into_iter().map(Recommendation::from));
                        if added > 0 {
                            info!(added, "recommendations refilled");
                        }
                        report.recommendations_added = added;
                    }
                    Err(e) if e.is_recs_sentinel() => {
                        debug!("no recommendations this cycle: {}", e);
                    }
                    Err(e) => {
                        warn!("Error fetching recommendations: {}", e);
                        report.failures += 1;
                    }
                }
            }
        }
        self.redraw.notify();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bus::redraw_channel;
    use crate::remote::mock::{raw_match, raw_rec, updates, RemoteCall, ScriptedRemote};
    use crate::remote::RemoteError;

    fn poller(remote: Arc<ScriptedRemote>, store: ProfileStore, redraw: RedrawSignal) -> Poller {
        Poller::new(store, remote, redraw, Duration::from_secs(5), Duration::from_secs(2))
    }

    fn queue_ids(profile: &crate::core::profile::Profile) -> Vec<String> {
        profile.recommendations().map(|r| r.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_successful_cycle_replaces_matches() -> anyhow::Result<()> {
        let remote = ScriptedRemote::new();
        let store = ProfileStore::new();
        let (signal, mut listener) = redraw_channel();
        let raw = vec![raw_match("m1", "Ada", 2), raw_match("m2", "Bo", 0)];
        remote.push_updates(Ok(updates(vec![raw_match("old", "Old", 1)])));
        remote.push_updates(Ok(updates(raw.clone())));

        let poller = poller(remote.clone(), store.clone(), signal);
        poller.poll_once().await;
        let report = poller.poll_once().await;

        assert!(report.matches_refreshed);
        let expected: Vec<Match> = raw.into_iter().map(Match::from).collect();
        assert_eq!(store.snapshot().await.matches(), expected.as_slice());
        assert!(listener.try_take());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_updates_keep_previous_matches_and_still_redraw() {
        let remote = ScriptedRemote::new();
        let store = ProfileStore::new();
        let (signal, mut listener) = redraw_channel();
        remote.push_updates(Ok(updates(vec![raw_match("m1", "Ada", 1)])));
        remote.push_updates(Err(RemoteError::Network("connection reset".to_string())));

        let poller = poller(remote.clone(), store.clone(), signal);
        poller.poll_once().await;
        let before = store.snapshot().await.matches().to_vec();
        assert!(listener.try_take());

        let report = poller.poll_once().await;
        assert!(!report.matches_refreshed);
        assert_eq!(report.failures, 1);
        assert_eq!(store.snapshot().await.matches(), before.as_slice());
        assert!(listener.try_take());
    }

    #[tokio::test]
    async fn test_empty_queue_is_refilled_in_response_order() {
        let remote = ScriptedRemote::new();
        let store = ProfileStore::new();
        let (signal, _listener) = redraw_channel();
        remote.push_recs(Ok(vec![raw_rec("A"), raw_rec("B"), raw_rec("C")]));

        let report = poller(remote.clone(), store.clone(), signal).poll_once().await;

        assert_eq!(report.recommendations_added, 3);
        assert_eq!(queue_ids(&store.snapshot().await), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_non_empty_queue_skips_recommendations() {
        let remote = ScriptedRemote::new();
        let store = ProfileStore::new();
        let (signal, _listener) = redraw_channel();
        remote.push_recs(Ok(vec![raw_rec("A")]));
        remote.push_recs(Ok(vec![raw_rec("Z")]));

        let poller = poller(remote.clone(), store.clone(), signal);
        poller.poll_once().await;
        let report = poller.poll_once().await;

        assert!(!report.recommendations_requested);
        assert_eq!(remote.count(&RemoteCall::FetchRecommendations), 1);
        assert_eq!(queue_ids(&store.snapshot().await), vec!["A"]);
    }

    #[tokio::test]
    async fn test_recs_sentinels_are_silent_and_retried() {
        let remote = ScriptedRemote::new();
        let store = ProfileStore::new();
        let (signal, mut listener) = redraw_channel();
        remote.push_recs(Err(RemoteError::RecsExhausted));
        remote.push_recs(Err(RemoteError::RecsTimeout));
        remote.push_recs(Ok(vec![raw_rec("A")]));

        let poller = poller(remote.clone(), store.clone(), signal);
        for _ in 0..2 {
            let report = poller.poll_once().await;
            assert_eq!(report.failures, 0);
            assert!(store.view(10).await.top.is_none());
            assert!(listener.try_take());
        }
        poller.poll_once().await;

        assert_eq!(remote.count(&RemoteCall::FetchRecommendations), 3);
        assert_eq!(queue_ids(&store.snapshot().await), vec!["A"]);
    }

    #[tokio::test]
    async fn test_other_recs_errors_are_counted_not_fatal() {
        let remote = ScriptedRemote::new();
        let store = ProfileStore::new();
        let (signal, _listener) = redraw_channel();
        remote.push_recs(Err(RemoteError::Status {
            status: 500,
            body: "oops".to_string(),
        }));

        let report = poller(remote.clone(), store.clone(), signal).poll_once().await;

        assert_eq!(report.failures, 1);
        assert!(report.matches_refreshed);
        assert!(store.snapshot().await.is_queue_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_updates_time_out_and_release_the_lock() {
        let remote = ScriptedRemote::new();
        remote.hang_updates();
        remote.push_recs(Ok(vec![raw_rec("A")]));
        let store = ProfileStore::new();
        let (signal, mut listener) = redraw_channel();

        let report = poller(remote.clone(), store.clone(), signal).poll_once().await;

        assert!(!report.matches_refreshed);
        assert_eq!(report.failures, 1);
        assert_eq!(queue_ids(&store.snapshot().await), vec!["A"]);
        assert!(listener.try_take());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_on_every_tick() {
        let remote = ScriptedRemote::new();
        let store = ProfileStore::new();
        let (signal, _listener) = redraw_channel();
        let handle = tokio::spawn(poller(remote.clone(), store, signal).run());

        tokio::time::sleep(Duration::from_millis(10_100)).await;
        assert_eq!(remote.count(&RemoteCall::FetchUpdates), 3);

        handle.abort();
        let _ = handle.await;
    }
}
