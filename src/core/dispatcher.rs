use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::bus::RedrawSignal;
use super::profile::ProfileStore;
use super::state::AppState;
use crate::remote::{with_timeout, RemoteClient, RemoteError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    Pass,
    Like,
}

impl fmt::Display for Swipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Swipe::Pass => write!(f, "pass"),
            Swipe::Like => write!(f, "like"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// Nothing to act on; no remote call was made.
    Empty,
    Passed { id: String },
    Liked { id: String, matched: bool },
    /// The remote call failed. The recommendation is consumed anyway.
    Failed { id: String, swipe: Swipe, error: RemoteError },
}

/// Applies user decisions to the head of the recommendation deck.
#[derive(Clone)]
pub struct ActionDispatcher {
    store: ProfileStore,
    remote: Arc<dyn RemoteClient>,
    redraw: RedrawSignal,
    timeout: Duration,
}

impl ActionDispatcher {
    pub fn new(
        store: ProfileStore,
        remote: Arc<dyn RemoteClient>,
        redraw: RedrawSignal,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            remote,
            redraw,
            timeout,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.store.clone(),
            state.remote.clone(),
            state.redraw.clone(),
            state.config.remote_timeout(),
        )
    }

    pub async fn pass(&self) -> SwipeOutcome {
        self.swipe(Swipe::Pass).await
    }

    pub async fn like(&self) -> SwipeOutcome {
        self.swipe(Swipe::Like).await
    }

    /// Acts on whatever is at the head when the lock is taken, then pops it
    /// whether or not the remote accepted the decision.
    pub async fn swipe(&self, swipe: Swipe) -> SwipeOutcome {
        let outcome = {
            let mut profile = self.store.exclusive().await;
            let Some(head) = profile.head() else {
                return SwipeOutcome::Empty;
            };
            let id = head.id.clone();
            let name = head.name.clone();

            let outcome = match swipe {
                Swipe::Pass => match with_timeout(self.timeout, self.remote.pass(&id)).await {
                    Ok(()) => SwipeOutcome::Passed { id },
                    Err(error) => SwipeOutcome::Failed { id, swipe, error },
                },
                Swipe::Like => match with_timeout(self.timeout, self.remote.like(&id)).await {
                    Ok(new_match) => {
                        if new_match.is_some() {
                            info!(
                                "It's a match with {}! It will show up on the next refresh.",
                                name
                            );
                        }
                        SwipeOutcome::Liked {
                            id,
                            matched: new_match.is_some(),
                        }
                    }
                    Err(error) => SwipeOutcome::Failed { id, swipe, error },
                },
            };
            profile.pop_head();
            outcome
        };

        match &outcome {
            SwipeOutcome::Failed { id, swipe, error } => {
                warn!("Error sending {} for {}: {}", swipe, id, error)
            }
            other => info!(?other, "swipe applied"),
        }
        self.redraw.notify();
        outcome
    }
}
