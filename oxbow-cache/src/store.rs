//! The query cache store
//!
//! A process-wide store of remote truth, injected into callers rather than
//! accessed as an ambient singleton. Given a key and a fetch function it
//! returns the cached value while fresh, refetches when stale or missing,
//! deduplicates concurrent fetches for the same key, and broadcasts prefix
//! invalidations to active observers.

use crate::entry::{CacheEntry, DynValue, QueryOptions, RetryPolicy};
use crate::key::QueryKey;
use crate::metrics::{CacheMetrics, CacheStats};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Boxed error returned by fetch functions
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared fetch error, cloneable across deduplicated callers
pub type FetchError = Arc<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by cache reads
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueryError {
    /// The query was disabled; no network call was made
    #[error("query is disabled")]
    Disabled,

    /// The fetch failed after exhausting its retry policy
    #[error("fetch failed: {0}")]
    Fetch(FetchError),

    /// A cached value did not have the requested type
    #[error("cached value has unexpected type for key {0}")]
    TypeMismatch(QueryKey),
}

impl QueryError {
    /// True when the error carries a failed fetch
    pub fn is_fetch(&self) -> bool {
        matches!(self, QueryError::Fetch(_))
    }
}

type FetchOutcome = Result<DynValue, FetchError>;

/// Capacity of the per-key broadcast used to share one in-flight result
const INFLIGHT_CHANNEL_CAPACITY: usize = 1;

/// Capacity of the invalidation event channel
const INVALIDATION_CHANNEL_CAPACITY: usize = 64;

/// The query cache
///
/// Construction is explicit and the store is shared via `Arc`; its lifecycle
/// is tied to application start and stop.
pub struct QueryCache {
    /// Cached values keyed by query key
    entries: DashMap<QueryKey, CacheEntry>,

    /// One broadcast sender per key currently being fetched
    inflight: DashMap<QueryKey, broadcast::Sender<FetchOutcome>>,

    /// Invalidated prefixes, observed by active subscribers
    invalidations: broadcast::Sender<QueryKey>,

    /// Usage counters
    metrics: CacheMetrics,
}

impl QueryCache {
    pub fn new() -> Self {
        let (invalidations, _) = broadcast::channel(INVALIDATION_CHANNEL_CAPACITY);
        QueryCache {
            entries: DashMap::new(),
            inflight: DashMap::new(),
            invalidations,
            metrics: CacheMetrics::new(),
        }
    }

    /// Get a cached value if fresh, otherwise fetch it
    ///
    /// Exactly one network request is issued per unique key: concurrent
    /// callers with the same key share the in-flight result, including its
    /// error. With `enabled == false` no network call is ever made.
    ///
    /// A stale entry blocks on the refetch; callers that want the stale
    /// value immediately read it via [`QueryCache::peek`] or subscribe with
    /// an observer.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: &QueryKey,
        options: &QueryOptions,
        fetcher: F,
    ) -> Result<Arc<T>, QueryError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, BoxError>>,
    {
        if !options.enabled {
            return Err(QueryError::Disabled);
        }

        loop {
            if let Some(value) = self.read_fresh::<T>(key)? {
                self.metrics.record_hit();
                return Ok(value);
            }

            // Join an in-flight fetch for this key, or become the leader.
            let waiter = match self.inflight.entry(key.clone()) {
                Entry::Occupied(occupied) => Some(occupied.get().subscribe()),
                Entry::Vacant(vacant) => {
                    let (tx, _rx) = broadcast::channel(INFLIGHT_CHANNEL_CAPACITY);
                    vacant.insert(tx);
                    None
                }
            };

            if let Some(mut rx) = waiter {
                self.metrics.record_join();
                match rx.recv().await {
                    Ok(Ok(value)) => return self.downcast::<T>(key, value),
                    Ok(Err(err)) => return self.stale_or_error::<T>(key, options, err),
                    // The leader went away without publishing; start over.
                    Err(_) => continue,
                }
            }

            self.metrics.record_miss();
            return self.lead_fetch(key, options, &fetcher).await;
        }
    }

    /// Run the fetch as the single in-flight leader for this key
    ///
    /// Cancellation-safe: if the leader's future is dropped mid-fetch, the
    /// guard releases the in-flight marker so joiners see the channel close
    /// and re-elect a leader instead of waiting forever.
    async fn lead_fetch<T, F, Fut>(
        &self,
        key: &QueryKey,
        options: &QueryOptions,
        fetcher: &F,
    ) -> Result<Arc<T>, QueryError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, BoxError>>,
    {
        let mut guard = InflightGuard {
            inflight: &self.inflight,
            key,
            published: false,
        };

        let started = Instant::now();
        let outcome: FetchOutcome = match self.run_with_retry(key, &options.retry, fetcher).await {
            Ok(value) => Ok(Arc::new(value) as DynValue),
            Err(err) => Err(err),
        };
        self.metrics.record_fetch(started.elapsed());

        if let Ok(value) = &outcome {
            self.store(key, value.clone(), options);
        }

        // Drop the in-flight marker before publishing so late subscribers
        // fall through to the freshly stored entry.
        let tx = self.inflight.remove(key).map(|(_, tx)| tx);
        guard.published = true;
        if let Some(tx) = tx {
            let _ = tx.send(outcome.clone());
        }

        match outcome {
            Ok(value) => self.downcast::<T>(key, value),
            Err(err) => self.stale_or_error::<T>(key, options, err),
        }
    }

    /// Execute the fetch function under the retry policy
    async fn run_with_retry<T, F, Fut>(
        &self,
        key: &QueryKey,
        policy: &RetryPolicy,
        fetcher: &F,
    ) -> Result<T, FetchError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, BoxError>>,
    {
        let mut attempt = 0u32;
        loop {
            match fetcher().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= policy.max_retries {
                        warn!(key = %key, attempts = attempt + 1, error = %err, "fetch failed");
                        return Err(Arc::from(err));
                    }
                    attempt += 1;
                    debug!(key = %key, attempt, error = %err, "retrying fetch");
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    /// Read a fresh entry, touching its access time
    fn read_fresh<T>(&self, key: &QueryKey) -> Result<Option<Arc<T>>, QueryError>
    where
        T: Send + Sync + 'static,
    {
        match self.entries.get_mut(key) {
            Some(mut entry) if entry.is_fresh() => {
                entry.touch();
                let value = entry.value.clone();
                drop(entry);
                self.downcast::<T>(key, value).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Serve the stale value under keep-previous, otherwise surface the error
    fn stale_or_error<T>(
        &self,
        key: &QueryKey,
        options: &QueryOptions,
        err: FetchError,
    ) -> Result<Arc<T>, QueryError>
    where
        T: Send + Sync + 'static,
    {
        if options.keep_previous {
            if let Some(mut entry) = self.entries.get_mut(key) {
                entry.touch();
                let value = entry.value.clone();
                drop(entry);
                debug!(key = %key, "serving stale value after failed refetch");
                return self.downcast::<T>(key, value);
            }
        }
        Err(QueryError::Fetch(err))
    }

    /// Store a fetched value, replacing any previous entry for the key
    fn store(&self, key: &QueryKey, value: DynValue, options: &QueryOptions) {
        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.stale_time = options.stale_time;
                entry.gc_time = options.gc_time;
                entry.refresh(value);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry::new(value, options.stale_time, options.gc_time));
            }
        }
    }

    fn downcast<T>(&self, key: &QueryKey, value: DynValue) -> Result<Arc<T>, QueryError>
    where
        T: Send + Sync + 'static,
    {
        value
            .downcast::<T>()
            .map_err(|_| QueryError::TypeMismatch(key.clone()))
    }

    /// Read the cached value for a key regardless of freshness
    ///
    /// Does not touch the access time and never fetches.
    pub fn peek<T>(&self, key: &QueryKey) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let value = self.entries.get(key)?.value.clone();
        value.downcast::<T>().ok()
    }

    /// Mark every entry whose key starts with `prefix` as stale
    ///
    /// Active observers with matching keys are notified and refetch.
    /// Returns the number of stored entries that matched.
    pub fn invalidate_prefix(&self, prefix: &QueryKey) -> usize {
        let mut matched = 0usize;
        for mut entry in self.entries.iter_mut() {
            if prefix.is_prefix_of(entry.key()) {
                entry.mark_invalidated();
                matched += 1;
            }
        }
        self.metrics.record_invalidation();
        debug!(prefix = %prefix, matched, "invalidated cache prefix");

        // Observers match by prefix themselves; send even when no stored
        // entry matched, a subscriber may hold a key not yet cached.
        let _ = self.invalidations.send(prefix.clone());
        matched
    }

    /// Subscribe to invalidation events
    pub fn subscribe(&self) -> broadcast::Receiver<QueryKey> {
        self.invalidations.subscribe()
    }

    /// Remove one entry
    pub fn remove(&self, key: &QueryKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Evict entries that outlived their gc window without being read
    ///
    /// Returns the number of entries evicted.
    pub fn evict_idle(&self) -> usize {
        let idle: Vec<QueryKey> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_idle())
            .map(|entry| entry.key().clone())
            .collect();

        let mut evicted = 0usize;
        for key in idle {
            if self.entries.remove(&key).is_some() {
                evicted += 1;
            }
        }

        if evicted > 0 {
            self.metrics.record_evictions(evicted as u64);
            debug!(evicted, "evicted idle cache entries");
        }
        evicted
    }

    /// Spawn a background task sweeping idle entries on an interval
    pub fn spawn_gc(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                cache.evict_idle();
            }
        })
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a snapshot of cache metrics
    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.entries.len())
    }
}

/// Releases a leader's in-flight marker if it is dropped before publishing
///
/// Removing the entry drops the broadcast sender, so joiners waiting on
/// `recv` observe `Closed` and loop back to elect a new leader.
struct InflightGuard<'a> {
    inflight: &'a DashMap<QueryKey, broadcast::Sender<FetchOutcome>>,
    key: &'a QueryKey,
    published: bool,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        if !self.published {
            self.inflight.remove(self.key);
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries.len())
            .field("inflight", &self.inflight.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn key() -> QueryKey {
        QueryKey::root("vendor").push("list").push(0u32).push(10u32)
    }

    fn failing(message: &str) -> BoxError {
        Box::new(io::Error::other(message.to_string()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_then_hit() {
        let cache = QueryCache::new();
        let calls = AtomicU32::new(0);

        let fetcher = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, BoxError>("v1".to_string())
        };

        let options = QueryOptions::default();
        let first = cache.fetch::<String, _, _>(&key(), &options, fetcher).await.unwrap();
        let second = cache.fetch::<String, _, _>(&key(), &options, fetcher).await.unwrap();

        assert_eq!(*first, "v1");
        assert_eq!(*second, "v1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_never_fetches() {
        let cache = QueryCache::new();
        let calls = AtomicU32::new(0);

        let fetcher = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, BoxError>(1u32)
        };

        let options = QueryOptions::default().enabled(false);
        let result = cache.fetch::<u32, _, _>(&key(), &options, fetcher).await;

        assert!(matches!(result, Err(QueryError::Disabled)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(cache.stats().fetches, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_window_triggers_refetch() {
        let cache = QueryCache::new();
        let calls = AtomicU32::new(0);

        let fetcher = || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok::<_, BoxError>(format!("v{n}"))
        };

        let options = QueryOptions::default().stale_time(Duration::from_secs(30));

        let first = cache.fetch::<String, _, _>(&key(), &options, fetcher).await.unwrap();
        assert_eq!(*first, "v1");

        tokio::time::advance(Duration::from_secs(31)).await;

        let second = cache.fetch::<String, _, _>(&key(), &options, fetcher).await.unwrap();
        assert_eq!(*second, "v2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidated_entry_refetches() {
        let cache = QueryCache::new();
        let calls = AtomicU32::new(0);

        let fetcher = || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok::<_, BoxError>(n)
        };

        let options = QueryOptions::default();
        cache.fetch::<u32, _, _>(&key(), &options, fetcher).await.unwrap();

        cache.invalidate_prefix(&QueryKey::root("vendor"));

        let second = cache.fetch::<u32, _, _>(&key(), &options, fetcher).await.unwrap();
        assert_eq!(*second, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidation_respects_prefix_boundaries() {
        let cache = QueryCache::new();
        let options = QueryOptions::default();

        let vendor_calls = AtomicU32::new(0);
        let mold_calls = AtomicU32::new(0);

        let vendor_key = QueryKey::root("vendor").push(1i64);
        let mold_key = QueryKey::root("moldInstance").push(1i64);

        let vendor_fetcher = || async {
            Ok::<_, BoxError>(vendor_calls.fetch_add(1, Ordering::SeqCst) + 1)
        };
        let mold_fetcher = || async {
            Ok::<_, BoxError>(mold_calls.fetch_add(1, Ordering::SeqCst) + 1)
        };

        cache.fetch::<u32, _, _>(&vendor_key, &options, vendor_fetcher).await.unwrap();
        cache.fetch::<u32, _, _>(&mold_key, &options, mold_fetcher).await.unwrap();

        cache.invalidate_prefix(&QueryKey::root("vendor"));

        cache.fetch::<u32, _, _>(&vendor_key, &options, vendor_fetcher).await.unwrap();
        cache.fetch::<u32, _, _>(&mold_key, &options, mold_fetcher).await.unwrap();

        assert_eq!(vendor_calls.load(Ordering::SeqCst), 2);
        assert_eq!(mold_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_fetches_deduplicate() {
        let cache = Arc::new(QueryCache::new());
        let calls = Arc::new(AtomicU32::new(0));

        let options = QueryOptions::default();
        let make_fetcher = |calls: Arc<AtomicU32>| {
            move || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok::<_, BoxError>("shared".to_string())
                }
            }
        };

        let k = key();
        let (a, b, c) = tokio::join!(
            cache.fetch::<String, _, _>(&k, &options, make_fetcher(calls.clone())),
            cache.fetch::<String, _, _>(&k, &options, make_fetcher(calls.clone())),
            cache.fetch::<String, _, _>(&k, &options, make_fetcher(calls.clone())),
        );

        assert_eq!(*a.unwrap(), "shared");
        assert_eq!(*b.unwrap(), "shared");
        assert_eq!(*c.unwrap(), "shared");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().joins, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_error_reaches_all_callers() {
        let cache = Arc::new(QueryCache::new());
        let calls = Arc::new(AtomicU32::new(0));

        let options = QueryOptions::default().retry(RetryPolicy::none());
        let make_fetcher = |calls: Arc<AtomicU32>| {
            move || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Err::<u32, BoxError>(failing("backend down"))
                }
            }
        };

        let k = key();
        let (a, b) = tokio::join!(
            cache.fetch::<u32, _, _>(&k, &options, make_fetcher(calls.clone())),
            cache.fetch::<u32, _, _>(&k, &options, make_fetcher(calls.clone())),
        );

        assert!(matches!(a, Err(QueryError::Fetch(_))));
        assert!(matches!(b, Err(QueryError::Fetch(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_policy_counts_attempts() {
        let cache = QueryCache::new();
        let calls = AtomicU32::new(0);

        let fetcher = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<u32, BoxError>(failing("flaky"))
        };

        let options = QueryOptions::default()
            .retry(RetryPolicy::new(2, Duration::from_millis(100)));
        let result = cache.fetch::<u32, _, _>(&key(), &options, fetcher).await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keep_previous_serves_stale_on_failure() {
        let cache = QueryCache::new();
        let calls = AtomicU32::new(0);

        let fetcher = || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n == 1 {
                Ok("v1".to_string())
            } else {
                Err::<String, BoxError>(failing("backend down"))
            }
        };

        let options = QueryOptions::default()
            .keep_previous(true)
            .retry(RetryPolicy::none());

        let first = cache.fetch::<String, _, _>(&key(), &options, fetcher).await.unwrap();
        assert_eq!(*first, "v1");

        tokio::time::advance(Duration::from_secs(31)).await;

        // Refetch fails; the stale value is served instead.
        let second = cache.fetch::<String, _, _>(&key(), &options, fetcher).await.unwrap();
        assert_eq!(*second, "v1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gc_evicts_idle_entries() {
        let cache = QueryCache::new();
        let options = QueryOptions::default().gc_time(Duration::from_secs(60));

        cache
            .fetch::<u32, _, _>(&key(), &options, || async { Ok::<_, BoxError>(1u32) })
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.evict_idle(), 0);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(cache.evict_idle(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_type_mismatch_is_guarded() {
        let cache = QueryCache::new();
        let options = QueryOptions::default();

        cache
            .fetch::<u32, _, _>(&key(), &options, || async { Ok::<_, BoxError>(1u32) })
            .await
            .unwrap();

        let wrong = cache
            .fetch::<String, _, _>(&key(), &options, || async {
                Ok::<_, BoxError>("s".to_string())
            })
            .await;

        assert!(matches!(wrong, Err(QueryError::TypeMismatch(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_peek_ignores_freshness() {
        let cache = QueryCache::new();
        let options = QueryOptions::default();

        cache
            .fetch::<u32, _, _>(&key(), &options, || async { Ok::<_, BoxError>(7u32) })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(120)).await;

        assert_eq!(cache.peek::<u32>(&key()).as_deref(), Some(&7));
        assert_eq!(cache.peek::<u32>(&QueryKey::root("missing")), None);
    }
}
