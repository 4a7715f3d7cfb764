//! Machine repair service (`/machine/machine-repair`)

use crate::api::{to_query, Api};
use crate::error::ApiError;
use chrono::NaiveDate;
use oxbow_types::{EntityId, FieldOption, FieldPayload, Page, PageRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PATH: &str = "machine/machine-repair";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRepair {
    pub id: EntityId,
    pub machine_id: EntityId,
    pub repair_date: NaiveDate,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub cost: Option<u64>,

    #[serde(default)]
    pub manager_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRepairSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<EntityId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub repair_date_from: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub repair_date_to: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRepairCreate {
    pub machine_id: EntityId,
    pub repair_date: NaiveDate,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRepairUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repair_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MachineRepairService {
    api: Arc<Api>,
}

impl MachineRepairService {
    pub fn new(api: Arc<Api>) -> Self {
        MachineRepairService { api }
    }

    pub async fn list(
        &self,
        search: &MachineRepairSearch,
        page: PageRequest,
    ) -> Result<Page<MachineRepair>, ApiError> {
        let mut query = to_query(&page);
        query.extend(to_query(search));
        self.api.get(PATH, query).await
    }

    pub async fn get(&self, id: EntityId) -> Result<MachineRepair, ApiError> {
        self.api.get(&format!("{PATH}/{id}"), Vec::new()).await
    }

    pub async fn create(&self, request: &MachineRepairCreate) -> Result<MachineRepair, ApiError> {
        self.api.post(PATH, request).await
    }

    pub async fn create_batch(
        &self,
        requests: &[MachineRepairCreate],
    ) -> Result<Vec<MachineRepair>, ApiError> {
        self.api.post(&format!("{PATH}/list"), requests).await
    }

    pub async fn update(
        &self,
        id: EntityId,
        patch: &MachineRepairUpdate,
    ) -> Result<MachineRepair, ApiError> {
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
