//! Production plan service (`/production/plan`)
//!
//! Plans are the parent of production commands; plan screens aggregate the
//! progress of the commands issued under them.

use crate::api::{to_query, Api};
use crate::error::ApiError;
use chrono::NaiveDate;
use oxbow_types::{EntityId, FieldOption, FieldPayload, Page, PageRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PATH: &str = "production/plan";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanState {
    Planned,
    Working,
    Done,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionPlan {
    pub id: EntityId,
    pub plan_code: String,
    pub item_id: EntityId,
    pub quantity: u64,
    pub state: PlanState,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionPlanSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<EntityId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PlanState>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionPlanCreate {
    pub item_id: EntityId,
    pub quantity: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionPlanUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PlanState>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct ProductionPlanService {
    api: Arc<Api>,
}

impl ProductionPlanService {
    pub fn new(api: Arc<Api>) -> Self {
        ProductionPlanService { api }
    }

    pub async fn list(
        &self,
        search: &ProductionPlanSearch,
        page: PageRequest,
    ) -> Result<Page<ProductionPlan>, ApiError> {
        let mut query = to_query(&page);
        query.extend(to_query(search));
        self.api.get(PATH, query).await
    }

    pub async fn get(&self, id: EntityId) -> Result<ProductionPlan, ApiError> {
        self.api.get(&format!("{PATH}/{id}"), Vec::new()).await
    }

    pub async fn create(&self, request: &ProductionPlanCreate) -> Result<ProductionPlan, ApiError> {
        self.api.post(PATH, request).await
    }

    pub async fn create_batch(
        &self,
        requests: &[ProductionPlanCreate],
    ) -> Result<Vec<ProductionPlan>, ApiError> {
        self.api.post(&format!("{PATH}/list"), requests).await
    }

    pub async fn update(
        &self,
        id: EntityId,
        patch: &ProductionPlanUpdate,
    ) -> Result<ProductionPlan, ApiError> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_roundtrip() {
        let raw = r#"{
            "id": 1,
            "planCode": "PLAN-2026-0001",
            "itemId": 12,
            "quantity": 1000,
            "state": "PLANNED",
            "startDate": "2026-09-01"
        }"#;

        let plan: ProductionPlan = serde_json::from_str(raw).unwrap();
        assert_eq!(plan.state, PlanState::Planned);
        assert_eq!(plan.quantity, 1000);
        assert!(plan.end_date.is_none());
    }

    #[test]
    fn test_search_skips_absent_filters() {
        let search = ProductionPlanSearch {
            state: Some(PlanState::Working),
            ..ProductionPlanSearch::default()
        };

        let value = serde_json::to_value(&search).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object["state"], "WORKING");
    }
}
