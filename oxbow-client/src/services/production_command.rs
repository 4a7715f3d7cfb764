//! Production command service (`/production/command`)
//!
//! Commands belong to a production plan (`plan_id`); listing by plan is the
//! common read path on the planning screens.

use crate::api::{to_query, Api};
use crate::error::ApiError;
use chrono::NaiveDate;
use oxbow_types::{EntityId, FieldOption, FieldPayload, Page, PageRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PATH: &str = "production/command";

/// Lifecycle state reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandState {
    Waiting,
    Working,
    Done,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionCommand {
    pub id: EntityId,
    pub command_code: String,
    pub plan_id: EntityId,
    pub item_id: EntityId,
    pub quantity: u64,
    pub state: CommandState,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionCommandSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<EntityId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<EntityId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<CommandState>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionCommandCreate {
    pub plan_id: EntityId,
    pub item_id: EntityId,
    pub quantity: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionCommandUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<CommandState>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct ProductionCommandService {
    api: Arc<Api>,
}

impl ProductionCommandService {
    pub fn new(api: Arc<Api>) -> Self {
        ProductionCommandService { api }
    }

    pub async fn list(
        &self,
        search: &ProductionCommandSearch,
        page: PageRequest,
    ) -> Result<Page<ProductionCommand>, ApiError> {
        let mut query = to_query(&page);
        query.extend(to_query(search));
        self.api.get(PATH, query).await
    }

    pub async fn get(&self, id: EntityId) -> Result<ProductionCommand, ApiError> {
        self.api.get(&format!("{PATH}/{id}"), Vec::new()).await
    }

    pub async fn create(
        &self,
        request: &ProductionCommandCreate,
    ) -> Result<ProductionCommand, ApiError> {
        self.api.post(PATH, request).await
    }

    pub async fn create_batch(
        &self,
        requests: &[ProductionCommandCreate],
    ) -> Result<Vec<ProductionCommand>, ApiError> {
        self.api.post(&format!("{PATH}/list"), requests).await
    }

    pub async fn update(
        &self,
        id: EntityId,
        patch: &ProductionCommandUpdate,
    ) -> Result<ProductionCommand, ApiError> {
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
