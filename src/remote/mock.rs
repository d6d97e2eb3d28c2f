//! Scripted in-memory remote used by the core tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::remote::{
    RawMatch, RawMessage, RawPerson, RawRecommendation, RemoteClient, RemoteError, UpdatesResponse,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Authenticate,
    FetchUpdates,
    FetchRecommendations,
    Like(String),
    Pass(String),
}

/// Pauses `fetch_recommendations` until released.
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

/// Answers each operation from its own script, falling back to a quiet
/// default once the script runs dry.
#[derive(Default)]
pub struct ScriptedRemote {
    updates: Mutex<VecDeque<Result<UpdatesResponse, RemoteError>>>,
    recs: Mutex<VecDeque<Result<Vec<RawRecommendation>, RemoteError>>>,
    likes: Mutex<VecDeque<Result<Option<RawMatch>, RemoteError>>>,
    passes: Mutex<VecDeque<Result<(), RemoteError>>>,
    calls: Mutex<Vec<RemoteCall>>,
    recs_gate: Mutex<Option<Arc<Gate>>>,
    hang_updates: AtomicBool,
}

impl ScriptedRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_updates(&self, result: Result<UpdatesResponse, RemoteError>) {
        self.updates.lock().unwrap().push_back(result);
    }

    pub fn push_recs(&self, result: Result<Vec<RawRecommendation>, RemoteError>) {
        self.recs.lock().unwrap().push_back(result);
    }

    pub fn push_like(&self, result: Result<Option<RawMatch>, RemoteError>) {
        self.likes.lock().unwrap().push_back(result);
    }

    pub fn push_pass(&self, result: Result<(), RemoteError>) {
        self.passes.lock().unwrap().push_back(result);
    }

    pub fn gate_recommendations(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate {
            entered: Notify::new(),
            release: Notify::new(),
        });
        *self.recs_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn hang_updates(&self) {
        self.hang_updates.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &RemoteCall) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: RemoteCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RemoteClient for ScriptedRemote {
    async fn authenticate(&self) -> Result<(), RemoteError> {
        self.record(RemoteCall::Authenticate);
        Ok(())
    }

    async fn fetch_updates(&self) -> Result<UpdatesResponse, RemoteError> {
        self.record(RemoteCall::FetchUpdates);
        if self.hang_updates.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.updates
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(UpdatesResponse::default()))
    }

    async fn fetch_recommendations(&self) -> Result<Vec<RawRecommendation>, RemoteError> {
        self.record(RemoteCall::FetchRecommendations);
        let gate = self.recs_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.recs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(RemoteError::RecsExhausted))
    }

    async fn like(&self, recommendation_id: &str) -> Result<Option<RawMatch>, RemoteError> {
        self.record(RemoteCall::Like(recommendation_id.to_string()));
        self.likes.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }

    async fn pass(&self, recommendation_id: &str) -> Result<(), RemoteError> {
        self.record(RemoteCall::Pass(recommendation_id.to_string()));
        self.passes.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

pub fn raw_rec(id: &str) -> RawRecommendation {
    RawRecommendation {
        id: id.to_string(),
        name: format!("Person {}", id),
        distance_mi: 4,
        bio: format!("bio of {}", id),
        birth_date: Some("1995-06-15T00:00:00.000Z".to_string()),
    }
}

pub fn raw_match(id: &str, name: &str, messages: usize) -> RawMatch {
    RawMatch {
        id: id.to_string(),
        common_friend_count: 1,
        common_like_count: 3,
        message_count: messages as u32,
        messages: (0..messages)
            .map(|i| RawMessage {
                id: format!("{}-msg-{}", id, i),
                match_id: id.to_string(),
                timestamp: 1_700_000_000_000 + i as i64,
                to: "me".to_string(),
                from: format!("{}-person", id),
                message: format!("message {}", i),
                sent: "2023-11-14T22:13:20.000Z".to_string(),
            })
            .collect(),
        person: RawPerson {
            id: format!("{}-person", id),
            bio: "likes tea".to_string(),
            birth: "1992-02-02T00:00:00.000Z".to_string(),
            gender: 1,
            name: name.to_string(),
            ping_time: "2023-11-14T22:00:00.000Z".to_string(),
        },
    }
}

pub fn updates(matches: Vec<RawMatch>) -> UpdatesResponse {
    UpdatesResponse { matches }
}
