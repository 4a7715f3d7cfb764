//! Mold instance service (`/mold/mold-instance`)
//!
//! Beyond plain CRUD, mold instances support two workflow operations:
//! putting instances into a production command (`input`) and taking them
//! back out (`collect`).

use crate::api::{to_query, Api};
use crate::error::ApiError;
use oxbow_types::{EntityId, FieldOption, FieldPayload, Page, PageRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PATH: &str = "mold/mold-instance";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoldInstance {
    pub id: EntityId,
    pub mold_instance_name: String,

    #[serde(default)]
    pub mold_instance_code: Option<String>,

    #[serde(default)]
    pub mold_master_id: Option<EntityId>,

    #[serde(default)]
    pub is_input: bool,

    #[serde(default = "super::default_true")]
    pub is_use: bool,

    #[serde(default)]
    pub shot_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoldInstanceSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mold_instance_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mold_master_id: Option<EntityId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_command_id: Option<EntityId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_input: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoldInstanceCreate {
    pub mold_instance_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mold_instance_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mold_master_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoldInstanceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mold_instance_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mold_instance_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mold_master_id: Option<EntityId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_use: Option<bool>,
}

/// Put mold instances into a production command
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoldInputRequest {
    pub input_command_id: EntityId,
    pub mold_instance_ids: Vec<EntityId>,
}

/// Take mold instances back out of production
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoldCollectRequest {
    pub mold_instance_ids: Vec<EntityId>,
}

#[derive(Debug, Clone)]
pub struct MoldInstanceService {
    api: Arc<Api>,
}

impl MoldInstanceService {
    pub fn new(api: Arc<Api>) -> Self {
        MoldInstanceService { api }
    }

    pub async fn list(
        &self,
        search: &MoldInstanceSearch,
        page: PageRequest,
    ) -> Result<Page<MoldInstance>, ApiError> {
        let mut query = to_query(&page);
        query.extend(to_query(search));
        self.api.get(PATH, query).await
    }

    pub async fn get(&self, id: EntityId) -> Result<MoldInstance, ApiError> {
        self.api.get(&format!("{PATH}/{id}"), Vec::new()).await
    }

    pub async fn create(&self, request: &MoldInstanceCreate) -> Result<MoldInstance, ApiError> {
        self.api.post(PATH, request).await
    }

    pub async fn create_batch(
        &self,
        requests: &[MoldInstanceCreate],
    ) -> Result<Vec<MoldInstance>, ApiError> {
        self.api.post(&format!("{PATH}/list"), requests).await
    }

    pub async fn update(
        &self,
        id: EntityId,
        patch: &MoldInstanceUpdate,
    ) -> Result<MoldInstance, ApiError> {
        self.api.put(&format!("{PATH}/{id}"), patch).await
    }

    pub async fn delete(&self, ids: &[EntityId]) -> Result<(), ApiError> {
        self.api
            .delete_with_body(PATH, &serde_json::json!({ "ids": ids }))
            .await
    }

    pub async fn input(&self, request: &MoldInputRequest) -> Result<(), ApiError> {
        self.api.put_status(&format!("{PATH}/input"), request).await
    }

    pub async fn collect(&self, request: &MoldCollectRequest) -> Result<(), ApiError> {
        self.api.put_status(&format!("{PATH}/collect"), request).await
    }

    pub async fn fields(&self, field_name: &str) -> Result<Vec<FieldOption>, ApiError> {
        let payload: FieldPayload = self
            .api
            .get(&format!("{PATH}/fields/{field_name}"), Vec::new())
            .await?;
        Ok(payload.into_options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_request_shape() {
        let request = MoldInputRequest {
            input_command_id: EntityId(7),
            mold_instance_ids: vec![EntityId(1), EntityId(2)],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["inputCommandId"], 7);
        assert_eq!(value["moldInstanceIds"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_search_skips_absent_filters() {
        let search = MoldInstanceSearch {
            input_command_id: Some(EntityId(9)),
            ..MoldInstanceSearch::default()
        };

        let value = serde_json::to_value(&search).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object["inputCommandId"], 9);
    }
}
