//! Cache metrics
//!
//! Instrumentation for tracking cache effectiveness: hits, misses, network
//! fetches, deduplicated joins, invalidations and evictions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters maintained by the query cache
#[derive(Debug, Default)]
pub struct CacheMetrics {
    /// Reads served from a fresh cache entry
    pub hit_count: AtomicU64,

    /// Reads that required a network fetch
    pub miss_count: AtomicU64,

    /// Fetches actually issued to the network
    pub fetch_count: AtomicU64,

    /// Callers that joined an already in-flight fetch instead of issuing one
    pub join_count: AtomicU64,

    /// Prefix invalidations applied
    pub invalidation_count: AtomicU64,

    /// Entries evicted by gc sweeps
    pub eviction_count: AtomicU64,

    /// Total time spent fetching (nanoseconds)
    pub total_fetch_time_ns: AtomicU64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hit_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.miss_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_join(&self) {
        self.join_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidation(&self) {
        self.invalidation_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evictions(&self, count: u64) {
        self.eviction_count.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_fetch(&self, duration: Duration) {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        self.total_fetch_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.hit_count.store(0, Ordering::Relaxed);
        self.miss_count.store(0, Ordering::Relaxed);
        self.fetch_count.store(0, Ordering::Relaxed);
        self.join_count.store(0, Ordering::Relaxed);
        self.invalidation_count.store(0, Ordering::Relaxed);
        self.eviction_count.store(0, Ordering::Relaxed);
        self.total_fetch_time_ns.store(0, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot
    pub fn snapshot(&self, entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hit_count.load(Ordering::Relaxed),
            misses: self.miss_count.load(Ordering::Relaxed),
            fetches: self.fetch_count.load(Ordering::Relaxed),
            joins: self.join_count.load(Ordering::Relaxed),
            invalidations: self.invalidation_count.load(Ordering::Relaxed),
            evictions: self.eviction_count.load(Ordering::Relaxed),
            total_fetch_time_ns: self.total_fetch_time_ns.load(Ordering::Relaxed),
            entries,
        }
    }
}

/// A point-in-time snapshot of cache metrics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub fetches: u64,
    pub joins: u64,
    pub invalidations: u64,
    pub evictions: u64,
    pub total_fetch_time_ns: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Get cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Get average fetch time
    pub fn avg_fetch_time(&self) -> Duration {
        if self.fetches == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_fetch_time_ns / self.fetches)
        }
    }
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Hits: {} | Misses: {} | Hit Rate: {:.1}%",
            self.hits,
            self.misses,
            self.hit_rate() * 100.0
        )?;
        writeln!(
            f,
            "Fetches: {} | Joins: {} | Avg Fetch: {:.2}ms",
            self.fetches,
            self.joins,
            self.avg_fetch_time().as_secs_f64() * 1000.0
        )?;
        writeln!(
            f,
            "Invalidations: {} | Evictions: {} | Entries: {}",
            self.invalidations, self.evictions, self.entries
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_basic() {
        let metrics = CacheMetrics::new();

        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();

        let stats = metrics.snapshot(1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 2.0 / 3.0);
    }

    #[test]
    fn test_metrics_fetch_time() {
        let metrics = CacheMetrics::new();

        metrics.record_fetch(Duration::from_millis(10));
        metrics.record_fetch(Duration::from_millis(20));

        let stats = metrics.snapshot(0);
        assert_eq!(stats.fetches, 2);
        assert_eq!(stats.avg_fetch_time(), Duration::from_millis(15));
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = CacheMetrics::new();

        metrics.record_hit();
        metrics.record_miss();
        metrics.record_join();
        metrics.reset();

        let stats = metrics.snapshot(0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.joins, 0);
    }
}
