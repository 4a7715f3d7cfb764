//! Cache entries and freshness accounting
//!
//! Each entry mirrors one remote value. An entry is *fresh* until its stale
//! window elapses or an invalidation marks it stale; a stale entry may still
//! be served under the keep-previous policy while a refetch is underway.
//! Entries unused for longer than their gc window are evicted entirely.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Type-erased cached value
pub type DynValue = Arc<dyn Any + Send + Sync>;

/// A cached value with freshness metadata
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached value
    pub value: DynValue,

    /// When the value was last written
    pub updated_at: Instant,

    /// When the entry was last read or written
    pub last_accessed: Instant,

    /// Duration after which the value is eligible for refetch
    pub stale_time: Duration,

    /// Duration of disuse after which the entry is evicted
    pub gc_time: Duration,

    /// Set by invalidation; forces the next read to refetch
    pub invalidated: bool,
}

impl CacheEntry {
    pub fn new(value: DynValue, stale_time: Duration, gc_time: Duration) -> Self {
        let now = Instant::now();
        CacheEntry {
            value,
            updated_at: now,
            last_accessed: now,
            stale_time,
            gc_time,
            invalidated: false,
        }
    }

    /// A fresh entry is served without touching the network
    pub fn is_fresh(&self) -> bool {
        !self.invalidated && self.updated_at.elapsed() < self.stale_time
    }

    /// A stale entry still holds data but is eligible for refetch
    pub fn is_stale(&self) -> bool {
        !self.is_fresh()
    }

    /// An idle entry has outlived its gc window without being read
    pub fn is_idle(&self) -> bool {
        self.last_accessed.elapsed() > self.gc_time
    }

    /// Record a read
    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }

    /// Replace the value after a refetch
    pub fn refresh(&mut self, value: DynValue) {
        let now = Instant::now();
        self.value = value;
        self.updated_at = now;
        self.last_accessed = now;
        self.invalidated = false;
    }

    /// Mark the entry stale without discarding its value
    pub fn mark_invalidated(&mut self) {
        self.invalidated = true;
    }
}

/// Fixed-count, fixed-delay retry for failed fetches
///
/// Retry semantics live here in the cache layer; the service layer below
/// never retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt
    pub max_retries: u32,

    /// Fixed delay between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        RetryPolicy {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }

    pub fn new(max_retries: u32, delay: Duration) -> Self {
        RetryPolicy { max_retries, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 1,
            delay: Duration::from_millis(250),
        }
    }
}

/// Per-query behavior knobs
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Skip fetching entirely when false (e.g. a required filter is missing)
    pub enabled: bool,

    /// Staleness window for values fetched through these options
    pub stale_time: Duration,

    /// Disuse window before eviction
    pub gc_time: Duration,

    /// Serve the previous stale value when a refetch fails
    pub keep_previous: bool,

    /// Retry policy applied to the fetch
    pub retry: RetryPolicy,
}

impl QueryOptions {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time;
        self
    }

    pub fn keep_previous(mut self, keep_previous: bool) -> Self {
        self.keep_previous = keep_previous;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            enabled: true,
            stale_time: Duration::from_secs(30),
            gc_time: Duration::from_secs(300),
            keep_previous: false,
            retry: RetryPolicy::default(),
        }
    }
}
