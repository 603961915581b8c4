//! Cache contract.
//!
//! One explicit interface with a single `invalidate` operation. Values are
//! JSON so a shared out-of-process cache (Redis and friends) can implement
//! the same contract as the in-process default; correctness must not depend
//! on single-process memory.
//!
//! Key conventions are owned by the server's cache module:
//! `consentType:slug:<slug>` and `user:state:<userId>`.

use std::time::Duration;

use async_trait::async_trait;

use consentd_core::ConsentError;

/// Errors from a cache backend.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache backend is unreachable or returned an error.
    #[error("cache backend error: {0}")]
    Backend(String),
}

impl From<CacheError> for ConsentError {
    fn from(err: CacheError) -> Self {
        ConsentError::storage_with_cause("cache error", err)
    }
}

/// A TTL-expiring key/value cache with explicit invalidation.
///
/// Entries for a key are either absent or reflect a value that was true in
/// the backing store at some point no older than the TTL they were set with.
#[async_trait]
pub trait ConsentCache: Send + Sync {
    /// Returns the cached value for a key, if present and unexpired.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError>;

    /// Stores a value under a key with the given time-to-live.
    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Removes a key. Removing an absent key is not an error.
    async fn invalidate(&self, key: &str) -> Result<(), CacheError>;
}
