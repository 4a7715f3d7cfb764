//! Oxbow query cache
//!
//! A cache-of-remote-truth for paged REST data: the client never owns
//! authoritative state, it mirrors server state with a staleness window.
//!
//! # Architecture
//!
//! The cache is organized around **query keys** — ordered tuples of
//! primitive values identifying one cached fetch result. Reads go through
//! [`QueryCache::fetch`], which returns the cached value while fresh and
//! otherwise runs the supplied fetch function, deduplicating concurrent
//! fetches for the same key.
//!
//! ## Invalidation
//!
//! Mutations never patch cached data locally. They call
//! [`QueryCache::invalidate_prefix`], which marks every entry whose key
//! starts with the prefix as stale and notifies active [`QueryObserver`]s,
//! which refetch.
//!
//! ## Key features
//!
//! - **Deduplication**: exactly one in-flight request per unique key;
//!   concurrent callers share the result, including errors
//! - **Staleness windows**: per-query `stale_time` before refetch and
//!   `gc_time` before eviction
//! - **Prefix invalidation**: invalidating `["vendor"]` affects
//!   `["vendor", 7]` and `["vendor", "list", 0, 10]`
//! - **Bounded retries**: a small fixed retry count with fixed delay,
//!   applied here and nowhere below
//!
//! # Example
//!
//! ```rust,ignore
//! use oxbow_cache::{QueryCache, QueryKey, QueryOptions};
//! use std::sync::Arc;
//!
//! let cache = Arc::new(QueryCache::new());
//! let key = QueryKey::root("vendor").push("list").push(0u32).push(10u32);
//!
//! let page = cache
//!     .fetch::<VendorPage, _, _>(&key, &QueryOptions::default(), || async {
//!         service.list(&search, page_request).await.map_err(Into::into)
//!     })
//!     .await?;
//! ```

#![warn(missing_debug_implementations)]

pub mod entry;
pub mod key;
pub mod metrics;
pub mod observer;
pub mod store;

pub use entry::{CacheEntry, DynValue, QueryOptions, RetryPolicy};
pub use key::{QueryKey, Segment};
pub use metrics::{CacheMetrics, CacheStats};
pub use observer::{ObservedState, QueryObserver};
pub use store::{BoxError, FetchError, QueryCache, QueryError};
