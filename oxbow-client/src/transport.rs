//! HTTP transport seam
//!
//! Services talk to the backend through the [`Transport`] trait so tests
//! can substitute an in-process fake. The real implementation wraps a
//! `reqwest::Client`. This layer performs no retries and applies no policy
//! beyond the configured timeout; retry semantics belong to the cache.

use crate::config::ClientConfig;
use crate::error::ApiError;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// HTTP verbs used by the entity services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// One request as the services describe it
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl TransportRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        TransportRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// The seam between services and the network
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one HTTP call and return the raw response body
    async fn send(&self, request: TransportRequest) -> Result<Value, ApiError>;
}

/// Production transport over `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = reqwest::Url::parse(&config.normalized_base_url())
            .map_err(|err| ApiError::InvalidBaseUrl(format!("{}: {err}", config.base_url)))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(HttpTransport { http, base_url })
    }

    fn url_for(&self, path: &str) -> Result<reqwest::Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ApiError::InvalidBaseUrl(format!("{path}: {err}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<Value, ApiError> {
        let url = self.url_for(&request.path)?;
        debug!(method = %request.method, %url, "sending request");

        let mut builder = match request.method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
            Method::Put => self.http.put(url),
            Method::Delete => self.http.delete(url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?.error_for_status()?;
        Ok(response.json::<Value>().await?)
    }
}
