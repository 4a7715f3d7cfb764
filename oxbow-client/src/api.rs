//! Envelope unwrapping over a transport
//!
//! Every backend response is wrapped in `{status, data, message}`. This
//! layer performs one HTTP call, checks the envelope status, and returns
//! `data` decoded into its schema. A non-success status raises
//! [`ApiError::Business`] and the partial payload is never returned.

use crate::error::ApiError;
use crate::transport::{Method, Transport, TransportRequest};
use oxbow_types::Envelope;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Typed REST access over a [`Transport`]
#[derive(Clone)]
pub struct Api {
    transport: Arc<dyn Transport>,
}

impl Api {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Api { transport }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        let raw = self
            .transport
            .send(TransportRequest::new(Method::Get, path).with_query(query))
            .await?;
        unwrap_data(raw)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let raw = self
            .transport
            .send(TransportRequest::new(Method::Post, path).with_body(serde_json::to_value(body)?))
            .await?;
        unwrap_data(raw)
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let raw = self
            .transport
            .send(TransportRequest::new(Method::Put, path).with_body(serde_json::to_value(body)?))
            .await?;
        unwrap_data(raw)
    }

    /// PUT where only the envelope status matters
    pub async fn put_status<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let raw = self
            .transport
            .send(TransportRequest::new(Method::Put, path).with_body(serde_json::to_value(body)?))
            .await?;
        unwrap_status(raw)
    }

    /// DELETE carrying ids in the body; only the envelope status matters
    pub async fn delete_with_body<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let raw = self
            .transport
            .send(
                TransportRequest::new(Method::Delete, path)
                    .with_body(serde_json::to_value(body)?),
            )
            .await?;
        unwrap_status(raw)
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api").finish_non_exhaustive()
    }
}

fn check_envelope(raw: Value) -> Result<Envelope<Value>, ApiError> {
    let envelope: Envelope<Value> = serde_json::from_value(raw)?;
    if !envelope.is_success() {
        let message = envelope
            .message
            .unwrap_or_else(|| format!("request failed with status '{}'", envelope.status));
        return Err(ApiError::Business { message });
    }
    Ok(envelope)
}

fn unwrap_data<T: DeserializeOwned>(raw: Value) -> Result<T, ApiError> {
    let envelope = check_envelope(raw)?;
    let data = envelope.data.ok_or(ApiError::MissingData)?;
    Ok(serde_json::from_value(data)?)
}

fn unwrap_status(raw: Value) -> Result<(), ApiError> {
    check_envelope(raw).map(|_| ())
}

/// Flatten a serializable filter into query pairs
///
/// Absent, null and empty-string values are dropped so that an unset filter
/// and a missing filter produce the same request.
pub fn to_query<P: Serialize>(params: &P) -> Vec<(String, String)> {
    let value = match serde_json::to_value(params) {
        Ok(value) => value,
        Err(_) => return Vec::new(),
    };

    let Value::Object(map) = value else {
        return Vec::new();
    };

    map.into_iter()
        .filter_map(|(key, value)| {
            let rendered = match value {
                Value::Null => return None,
                Value::String(s) if s.is_empty() => return None,
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                // Nested structures are not representable as query params.
                Value::Array(_) | Value::Object(_) => return None,
            };
            Some((key, rendered))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_success() {
        let raw = json!({"status": "success", "data": {"id": 42, "vendorName": "ACME"}});
        let value: Value = unwrap_data(raw).unwrap();
        assert_eq!(value["id"], 42);
    }

    #[test]
    fn test_fail_status_never_returns_data() {
        let raw = json!({"status": "fail", "data": {"id": 42}, "message": "duplicate vendor code"});
        let result: Result<Value, ApiError> = unwrap_data(raw);

        match result {
            Err(ApiError::Business { message }) => assert_eq!(message, "duplicate vendor code"),
            other => panic!("expected business error, got {other:?}"),
        }
    }

    #[test]
    fn test_fail_status_without_message() {
        let raw = json!({"status": "error"});
        let result: Result<Value, ApiError> = unwrap_data(raw);
        assert!(matches!(result, Err(ApiError::Business { .. })));
    }

    #[test]
    fn test_success_without_data() {
        let raw = json!({"status": "success"});
        let result: Result<Value, ApiError> = unwrap_data(raw);
        assert!(matches!(result, Err(ApiError::MissingData)));

        // Status-only unwrapping accepts it.
        let raw = json!({"status": "success"});
        assert!(unwrap_status(raw).is_ok());
    }

    #[test]
    fn test_to_query_drops_absent_values() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Search {
            vendor_name: Option<String>,
            vendor_code: Option<String>,
            is_use: Option<bool>,
            page: u32,
        }

        let query = to_query(&Search {
            vendor_name: Some("ACME".to_string()),
            vendor_code: Some(String::new()),
            is_use: Some(true),
            page: 0,
        });

        assert!(query.contains(&("vendorName".to_string(), "ACME".to_string())));
        assert!(query.contains(&("isUse".to_string(), "true".to_string())));
        assert!(query.contains(&("page".to_string(), "0".to_string())));
        assert!(!query.iter().any(|(k, _)| k == "vendorCode"));
    }
}
