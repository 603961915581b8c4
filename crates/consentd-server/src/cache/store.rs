//! Moka-backed cache implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use consentd_store::{CacheError, ConsentCache};

use crate::metrics::CacheMetrics;

/// Cache tuning knobs.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Maximum number of entries (default: 10000).
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

/// One cached value together with the TTL it was stored with.
///
/// The TTL lives on the entry, not the cache, because the two key families
/// expire at different rates (consent types are long-lived, derived user
/// state is short-lived).
#[derive(Clone)]
struct CacheEntry {
    value: serde_json::Value,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, CacheEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process TTL cache implementing the `ConsentCache` contract.
/// Thread-safe and async-friendly.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use consentd_server::cache::{CacheSettings, MokaCache};
/// use consentd_store::ConsentCache;
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache = MokaCache::new(CacheSettings::default());
/// cache
///     .set("user:state:abc", serde_json::json!([]), Duration::from_secs(300))
///     .await
///     .unwrap();
/// assert!(cache.get("user:state:abc").await.unwrap().is_some());
/// # }
/// ```
#[derive(Clone)]
pub struct MokaCache {
    inner: Cache<String, CacheEntry>,
    metrics: CacheMetrics,
}

impl MokaCache {
    /// Creates a new cache with the given settings.
    pub fn new(settings: CacheSettings) -> Self {
        let metrics = CacheMetrics::new();

        let eviction_metrics = metrics.clone();
        let inner = Cache::builder()
            .max_capacity(settings.max_capacity)
            .expire_after(PerEntryTtl)
            .eviction_listener(move |_key, _value, cause| {
                let reason = match cause {
                    moka::notification::RemovalCause::Expired => "ttl",
                    moka::notification::RemovalCause::Size => "capacity",
                    moka::notification::RemovalCause::Explicit => "manual",
                    moka::notification::RemovalCause::Replaced => "replaced",
                };
                eviction_metrics.record_eviction(reason);
            })
            .build();

        Self { inner, metrics }
    }

    /// Returns the approximate number of cached entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Returns the metrics recorder for external access.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Forces pending maintenance, so expired entries become observable.
    #[cfg(test)]
    pub(crate) async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

#[async_trait]
impl ConsentCache for MokaCache {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        let start = Instant::now();
        let entry = self.inner.get(key).await;

        if entry.is_some() {
            self.metrics.record_hit();
        } else {
            self.metrics.record_miss();
        }
        self.metrics.record_operation_duration("get", start.elapsed());
        self.metrics.update_entry_count(self.inner.entry_count());

        Ok(entry.map(|e| e.value))
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let start = Instant::now();
        self.inner
            .insert(key.to_string(), CacheEntry { value, ttl })
            .await;
        self.metrics.record_operation_duration("set", start.elapsed());
        self.metrics.update_entry_count(self.inner.entry_count());
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.inner.invalidate(key).await;
        Ok(())
    }
}
