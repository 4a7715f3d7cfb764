//! Vendor service (`/purchase/vendors`)

use crate::api::{to_query, Api};
use crate::error::ApiError;
use oxbow_types::{EntityId, FieldOption, FieldPayload, Page, PageRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PATH: &str = "purchase/vendors";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: EntityId,
    pub vendor_name: String,

    #[serde(default)]
    pub vendor_code: Option<String>,

    #[serde(default)]
    pub business_number: Option<String>,

    #[serde(default)]
    pub manager_name: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default = "super::default_true")]
    pub is_use: bool,
}

/// Filters accepted by the vendor list endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_use: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorCreate {
    pub vendor_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Partial update; absent fields are left unchanged server-side
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_use: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct VendorService {
    api: Arc<Api>,
}

impl VendorService {
    pub fn new(api: Arc<Api>) -> Self {
        VendorService { api }
    }

    pub async fn list(
        &self,
        search: &VendorSearch,
        page: PageRequest,
    ) -> Result<Page<Vendor>, ApiError> {
        let mut query = to_query(&page);
        query.extend(to_query(search));
        self.api.get(PATH, query).await
    }

    pub async fn get(&self, id: EntityId) -> Result<Vendor, ApiError> {
        self.api.get(&format!("{PATH}/{id}"), Vec::new()).await
    }

    pub async fn create(&self, request: &VendorCreate) -> Result<Vendor, ApiError> {
        self.api.post(PATH, request).await
    }

    pub async fn create_batch(&self, requests: &[VendorCreate]) -> Result<Vec<Vendor>, ApiError> {
        self.api.post(&format!("{PATH}/list"), requests).await
    }

    pub async fn update(&self, id: EntityId, patch: &VendorUpdate) -> Result<Vendor, ApiError> {
        self.api.put(&format!("{PATH}/{id}"), patch).await
    }

    pub async fn delete(&self, ids: &[EntityId]) -> Result<(), ApiError> {
        self.api
            .delete_with_body(PATH, &serde_json::json!({ "ids": ids }))
            .await
    }

    pub async fn fields(&self, field_name: &str) -> Result<Vec<FieldOption>, ApiError> {
        let payload: FieldPayload = self
            .api
            .get(&format!("{PATH}/fields/{field_name}"), Vec::new())
            .await?;
        Ok(payload.into_options())
    }
}
