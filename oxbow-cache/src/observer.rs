//! Active query observers
//!
//! An observer binds a key and fetch function to the cache and keeps the
//! result current: when an invalidated prefix matches the observed key, the
//! observer refetches and publishes the new state. Dropping the observer
//! stops its task — the unmount semantics of a subscribed component. There
//! is no cross-request cancellation beyond that.

use crate::entry::QueryOptions;
use crate::key::QueryKey;
use crate::store::{BoxError, QueryCache, QueryError};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Current state of an observed query
#[derive(Debug, Clone)]
pub enum ObservedState<T> {
    /// Initial fetch has not completed yet
    Pending,

    /// Latest fetch succeeded
    Ready(Arc<T>),

    /// Latest fetch failed; the component decides how to display it
    Failed(QueryError),
}

impl<T> ObservedState<T> {
    pub fn data(&self) -> Option<Arc<T>> {
        match self {
            ObservedState::Ready(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ObservedState::Pending)
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self {
            ObservedState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// A live subscription to one query key
pub struct QueryObserver<T> {
    key: QueryKey,
    rx: watch::Receiver<ObservedState<T>>,
    task: JoinHandle<()>,
}

impl<T> QueryObserver<T> {
    /// The observed key
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Latest published state
    pub fn state(&self) -> ObservedState<T>
    where
        T: Clone,
    {
        self.rx.borrow().clone()
    }

    /// Latest data, if the last fetch succeeded
    pub fn data(&self) -> Option<Arc<T>> {
        self.rx.borrow().data()
    }

    /// Wait for the next state change
    ///
    /// Returns false once the observer task has stopped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

impl<T> Drop for QueryObserver<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl<T> std::fmt::Debug for QueryObserver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryObserver").field("key", &self.key).finish()
    }
}

impl QueryCache {
    /// Observe a key: fetch it now and refetch on matching invalidations
    pub fn observe<T, F, Fut>(
        self: &Arc<Self>,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> QueryObserver<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send,
    {
        let (tx, rx) = watch::channel(ObservedState::Pending);
        let cache = Arc::clone(self);
        let mut invalidations = self.subscribe();
        let observed_key = key.clone();

        let task = tokio::spawn(async move {
            let state = run_fetch(&cache, &observed_key, &options, &fetcher).await;
            if tx.send(state).is_err() {
                return;
            }

            loop {
                match invalidations.recv().await {
                    Ok(prefix) => {
                        if !prefix.is_prefix_of(&observed_key) {
                            continue;
                        }
                        debug!(key = %observed_key, prefix = %prefix, "observer refetching");
                    }
                    // Missed events; the match is unknown, so refetch.
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(key = %observed_key, skipped, "observer lagged, refetching");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }

                let state = run_fetch(&cache, &observed_key, &options, &fetcher).await;
                if tx.send(state).is_err() {
                    break;
                }
            }
        });

        QueryObserver { key, rx, task }
    }
}

async fn run_fetch<T, F, Fut>(
    cache: &QueryCache,
    key: &QueryKey,
    options: &QueryOptions,
    fetcher: &F,
) -> ObservedState<T>
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, BoxError>>,
{
    match cache.fetch::<T, _, _>(key, options, fetcher).await {
        Ok(value) => ObservedState::Ready(value),
        Err(err) => ObservedState::Failed(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn key() -> QueryKey {
        QueryKey::root("vendor").push("list").push(0u32).push(10u32)
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_initial_fetch() {
        let cache = Arc::new(QueryCache::new());

        let mut observer = cache.observe::<String, _, _>(key(), QueryOptions::default(), || async {
            Ok("v1".to_string())
        });

        assert!(observer.changed().await);
        assert_eq!(observer.data().as_deref(), Some(&"v1".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_refetches_on_matching_invalidation() {
        let cache = Arc::new(QueryCache::new());
        let calls = Arc::new(AtomicU32::new(0));

        let fetch_calls = calls.clone();
        let mut observer = cache.observe::<u32, _, _>(key(), QueryOptions::default(), move || {
            let calls = fetch_calls.clone();
            async move { Ok(calls.fetch_add(1, Ordering::SeqCst) + 1) }
        });

        assert!(observer.changed().await);
        assert_eq!(observer.data().as_deref(), Some(&1));

        cache.invalidate_prefix(&QueryKey::root("vendor"));

        assert!(observer.changed().await);
        assert_eq!(observer.data().as_deref(), Some(&2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_ignores_unrelated_invalidation() {
        let cache = Arc::new(QueryCache::new());
        let calls = Arc::new(AtomicU32::new(0));

        let fetch_calls = calls.clone();
        let mut observer = cache.observe::<u32, _, _>(key(), QueryOptions::default(), move || {
            let calls = fetch_calls.clone();
            async move { Ok(calls.fetch_add(1, Ordering::SeqCst) + 1) }
        });

        assert!(observer.changed().await);
        cache.invalidate_prefix(&QueryKey::root("moldInstance"));

        // Give the observer task a chance to run; no refetch should happen.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(observer.data().as_deref(), Some(&1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_surfaces_errors() {
        let cache = Arc::new(QueryCache::new());

        let options = QueryOptions::default().retry(crate::entry::RetryPolicy::none());
        let mut observer = cache.observe::<u32, _, _>(key(), options, || async {
            Err::<u32, BoxError>(Box::new(std::io::Error::other("backend down")))
        });

        assert!(observer.changed().await);
        let state = observer.state();
        assert!(matches!(state, ObservedState::Failed(QueryError::Fetch(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_observer_stops_refetching() {
        let cache = Arc::new(QueryCache::new());
        let calls = Arc::new(AtomicU32::new(0));

        let fetch_calls = calls.clone();
        let mut observer = cache.observe::<u32, _, _>(key(), QueryOptions::default(), move || {
            let calls = fetch_calls.clone();
            async move { Ok(calls.fetch_add(1, Ordering::SeqCst) + 1) }
        });

        assert!(observer.changed().await);
        drop(observer);

        cache.invalidate_prefix(&QueryKey::root("vendor"));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
