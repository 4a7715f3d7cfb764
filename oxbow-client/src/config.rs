//! Client configuration

use oxbow_cache::{QueryOptions, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for a [`crate::Client`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every entity path is resolved against
    pub base_url: String,

    /// Request timeout applied by the HTTP client
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub query: QueryDefaults,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Default cache behavior for queries issued through the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryDefaults {
    #[serde(default = "default_stale_secs")]
    pub stale_secs: u64,

    #[serde(default = "default_gc_secs")]
    pub gc_secs: u64,

    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default)]
    pub keep_previous: bool,
}

fn default_stale_secs() -> u64 {
    30
}

fn default_gc_secs() -> u64 {
    300
}

fn default_retry_count() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    250
}

impl Default for QueryDefaults {
    fn default() -> Self {
        QueryDefaults {
            stale_secs: default_stale_secs(),
            gc_secs: default_gc_secs(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
            keep_previous: false,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ClientConfig {
            base_url: base_url.into(),
            timeout_secs: default_timeout_secs(),
            query: QueryDefaults::default(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Cache options derived from the configured defaults
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions::default()
            .stale_time(Duration::from_secs(self.query.stale_secs))
            .gc_time(Duration::from_secs(self.query.gc_secs))
            .keep_previous(self.query.keep_previous)
            .retry(RetryPolicy::new(
                self.query.retry_count,
                Duration::from_millis(self.query.retry_delay_ms),
            ))
    }

    /// Base URL normalized to end with a slash so paths join predictably
    pub fn normalized_base_url(&self) -> String {
        let trimmed = self.base_url.trim();
        if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        }
    }
}
