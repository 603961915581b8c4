//! Cache metrics recording.

use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registers cache metric descriptions. Call once at startup.
pub fn register_cache_metrics() {
    metrics::describe_counter!("consentd_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("consentd_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "consentd_cache_evictions_total",
        "Total number of cache evictions"
    );
    metrics::describe_gauge!(
        "consentd_cache_entries",
        "Current number of entries in cache"
    );
    metrics::describe_histogram!(
        "consentd_cache_operation_seconds",
        "Time spent on cache operations"
    );
}

/// Cache metrics recorder. Keeps local atomic counters alongside the
/// exported metrics so hit rates are cheap to read in-process.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self {
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a cache hit.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("consentd_cache_hits_total").increment(1);
    }

    /// Records a cache miss.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("consentd_cache_misses_total").increment(1);
    }

    /// Records an eviction with its cause.
    pub fn record_eviction(&self, reason: &str) {
        counter!("consentd_cache_evictions_total", "reason" => reason.to_string()).increment(1);
    }

    /// Updates the entry-count gauge.
    pub fn update_entry_count(&self, count: u64) {
        gauge!("consentd_cache_entries").set(count as f64);
    }

    /// Records the duration of one cache operation.
    pub fn record_operation_duration(&self, operation: &str, duration: Duration) {
        histogram!(
            "consentd_cache_operation_seconds",
            "operation" => operation.to_string()
        )
        .record(duration.as_secs_f64());
    }

    /// Hit rate over the lifetime of this recorder.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let misses = self.misses.load(Ordering::Relaxed) as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    /// Returns the number of hits.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns the number of misses.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self::new()
    }
}
