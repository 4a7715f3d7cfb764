//! Client assembly
//!
//! A [`Client`] wires the transport, the shared [`QueryCache`] and the
//! notification hub together, and hands out per-entity query facades.

use crate::api::Api;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::notify::NotificationHub;
use crate::transport::{HttpTransport, Transport};
use oxbow_cache::{QueryCache, QueryKey, QueryOptions};
use oxbow_types::Notice;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Client {
    api: Arc<Api>,
    cache: Arc<QueryCache>,
    notices: NotificationHub,
    defaults: QueryOptions,
}

impl Client {
    /// Build a client talking to the configured backend over HTTP
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport), config.query_options()))
    }

    /// Build a client over an arbitrary transport
    ///
    /// Tests use this with an in-process fake instead of a live backend.
    pub fn with_transport(transport: Arc<dyn Transport>, defaults: QueryOptions) -> Self {
        Client {
            api: Arc::new(Api::new(transport)),
            cache: Arc::new(QueryCache::new()),
            notices: NotificationHub::new(),
            defaults,
        }
    }

    pub fn api(&self) -> &Arc<Api> {
        &self.api
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn notices(&self) -> &NotificationHub {
        &self.notices
    }

    pub fn defaults(&self) -> &QueryOptions {
        &self.defaults
    }

    /// Run a mutation, then invalidate the affected key prefixes
    ///
    /// On success every prefix in `invalidates` is invalidated so active
    /// observers refetch. On failure nothing is invalidated and an error
    /// notice is published; the cached state is still the last server truth.
    pub(crate) async fn mutate<T>(
        &self,
        label: &str,
        invalidates: &[QueryKey],
        op: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, ApiError> {
        match op.await {
            Ok(value) => {
                for prefix in invalidates {
                    let count = self.cache.invalidate_prefix(prefix);
                    debug!(%prefix, count, "invalidated after {label}");
                }
                Ok(value)
            }
            Err(err) => {
                warn!(%err, "{label} failed");
                self.notices
                    .publish(Notice::error(format!("{label} failed: {err}")));
                Err(err)
            }
        }
    }
}
