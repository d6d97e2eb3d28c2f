pub mod error;
pub mod http;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use error::RemoteError;
pub use http::HttpRemote;
pub use types::{RawMatch, RawMessage, RawPerson, RawRecommendation, UpdatesResponse};

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// The remote API as the client core sees it.
///
/// Implementations must be callable from several tasks at once; the core
/// itself serializes every call that touches profile state.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn authenticate(&self) -> Result<(), RemoteError>;
    async fn fetch_updates(&self) -> Result<UpdatesResponse, RemoteError>;
    async fn fetch_recommendations(&self) -> Result<Vec<RawRecommendation>, RemoteError>;
    /// Returns the new match when the like closed one.
    async fn like(&self, recommendation_id: &str) -> Result<Option<RawMatch>, RemoteError>;
    async fn pass(&self, recommendation_id: &str) -> Result<(), RemoteError>;
}

/// Bounds a remote call so a hung connection cannot pin the profile lock.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, RemoteError>
where
    F: Future<Output = Result<T, RemoteError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(RemoteError::Timeout),
    }
}
