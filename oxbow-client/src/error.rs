//! Client error taxonomy
//!
//! Three failure classes reach callers: transport failures propagated from
//! the HTTP client, business failures (`status != "success"` in the
//! envelope), and decode failures for payloads that do not match their
//! schema. None of them are fatal to the process; mutations surface a
//! transient notice, queries expose the error to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or HTTP-level failure from the underlying client
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success envelope status
    #[error("{message}")]
    Business { message: String },

    /// A success envelope arrived without the expected `data` field
    #[error("response contained no data")]
    MissingData,

    /// The payload did not match the expected schema
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL could not be parsed
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    pub fn business(message: impl Into<String>) -> Self {
        ApiError::Business {
            message: message.into(),
        }
    }

    pub fn is_business(&self) -> bool {
        matches!(self, ApiError::Business { .. })
    }
}
