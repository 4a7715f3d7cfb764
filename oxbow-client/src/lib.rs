//! Oxbow client
//!
//! Typed REST services and cached entity queries over a shared
//! [`oxbow_cache::QueryCache`]. The client mirrors server state rather than
//! owning it: reads go through the cache with a staleness window, mutations
//! hit the backend and invalidate key prefixes so observers refetch.
//!
//! # Layers
//!
//! - [`transport`] — the HTTP seam; tests substitute an in-process fake
//! - [`api`] — envelope unwrapping (`{status, data, message}`) over a transport
//! - [`services`] — one thin service per business entity, no caching
//! - [`queries`] — cached facades pairing each service with the query cache
//!
//! # Example
//!
//! ```rust,no_run
//! use oxbow_client::{Client, ClientConfig};
//! use oxbow_client::services::vendor::VendorSearch;
//! use oxbow_types::PageRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(&ClientConfig::new("http://erp.local/api"))?;
//! let vendors = client.vendors();
//!
//! let page = vendors
//!     .list(&VendorSearch::default(), PageRequest::default())
//!     .await?;
//! for vendor in &page.content {
//!     println!("{}: {}", vendor.id, vendor.vendor_name);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_debug_implementations)]

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod notify;
pub mod queries;
pub mod services;
pub mod transport;

pub use api::Api;
pub use client::Client;
pub use config::{ClientConfig, ConfigError, QueryDefaults};
pub use error::ApiError;
pub use notify::NotificationHub;
pub use transport::{HttpTransport, Method, Transport, TransportRequest};
