//! Shared wire types for oxbow
//!
//! This crate provides the common types used across the oxbow ecosystem:
//! the REST response envelope, paged list payloads, field option lists,
//! and transient user notifications.

use serde::{Deserialize, Serialize};

/// Status string the backend uses for successful responses
pub const STATUS_SUCCESS: &str = "success";

/// Backend-assigned entity identifier
///
/// Identifiers are always assigned by the remote backend, never generated
/// client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub i64);

impl EntityId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId(id)
    }
}

impl From<EntityId> for i64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `{status, data, message}` wrapper used by every REST response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Wrap a value in a success envelope
    pub fn success(data: T) -> Self {
        Envelope {
            status: STATUS_SUCCESS.to_string(),
            data: Some(data),
            message: None,
        }
    }

    /// Build a failure envelope carrying a human-readable message
    pub fn failure(status: impl Into<String>, message: impl Into<String>) -> Self {
        Envelope {
            status: status.into(),
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// One page of a remote list
///
/// Field names follow the backend's camelCase page payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub size: u32,
    pub number: u32,
    pub empty: bool,
}

impl<T> Page<T> {
    /// Build a single page from an in-memory slice (used by tests and fakes)
    pub fn from_items(items: Vec<T>, total_elements: u64, size: u32, number: u32) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            ((total_elements + u64::from(size) - 1) / u64::from(size)) as u32
        };
        let empty = items.is_empty();

        Page {
            content: items,
            total_elements,
            total_pages,
            size,
            number,
            empty,
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Page and size for a list request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 10 }
    }
}

/// One entry of a `/entity/fields/{fieldName}` lookup list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    pub id: EntityId,
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default)]
    pub disabled: bool,
}

/// The two payload shapes the fields endpoints return
///
/// Some backends return a bare option array, others wrap the options in a
/// page object. Both shapes are accepted explicitly here; anything else is
/// a decode error.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldPayload {
    Options(Vec<FieldOption>),
    Page(Page<FieldOption>),
}

impl FieldPayload {
    pub fn into_options(self) -> Vec<FieldOption> {
        match self {
            FieldPayload::Options(options) => options,
            FieldPayload::Page(page) => page.content,
        }
    }
}

/// Severity of a transient user notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A transient user notification
///
/// Notices are surfaced when a mutation fails and are never fatal; they are
/// scoped to the interaction that triggered them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success() {
        let env = Envelope::success(42u32);
        assert!(env.is_success());
        assert_eq!(env.data, Some(42));
    }

    #[test]
    fn test_envelope_failure_roundtrip() {
        let raw = r#"{"status":"fail","message":"duplicate code"}"#;
        let env: Envelope<serde_json::Value> = serde_json::from_str(raw).unwrap();

        assert!(!env.is_success());
        assert!(env.data.is_none());
        assert_eq!(env.message.as_deref(), Some("duplicate code"));
    }

    #[test]
    fn test_page_deserializes_camel_case() {
        let raw = r#"{
            "content": [1, 2, 3],
            "totalElements": 27,
            "totalPages": 3,
            "size": 10,
            "number": 0,
            "empty": false
        }"#;

        let page: Page<u32> = serde_json::from_str(raw).unwrap();
        assert_eq!(page.content, vec![1, 2, 3]);
        assert_eq!(page.total_elements, 27);
        assert_eq!(page.total_pages, 3);
        assert!(page.len() <= page.size as usize);
    }

    #[test]
    fn test_page_from_items() {
        let page = Page::from_items(vec![1, 2, 3], 23, 10, 0);
        assert_eq!(page.total_pages, 3);
        assert!(!page.empty);

        let empty: Page<u32> = Page::from_items(vec![], 0, 10, 0);
        assert!(empty.empty);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_field_payload_both_shapes() {
        let bare = r#"[{"id": 1, "value": "steel"}]"#;
        let payload: FieldPayload = serde_json::from_str(bare).unwrap();
        assert_eq!(payload.into_options().len(), 1);

        let paged = r#"{
            "content": [{"id": 1, "value": "steel"}, {"id": 2, "value": "brass"}],
            "totalElements": 2,
            "totalPages": 1,
            "size": 10,
            "number": 0,
            "empty": false
        }"#;
        let payload: FieldPayload = serde_json::from_str(paged).unwrap();
        assert_eq!(payload.into_options().len(), 2);
    }
}
