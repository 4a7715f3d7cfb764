//! Cached machine repair queries

use super::search_segment;
use crate::client::Client;
use crate::error::ApiError;
use crate::services::machine_repair::{
    MachineRepair, MachineRepairCreate, MachineRepairSearch, MachineRepairService,
    MachineRepairUpdate,
};
use oxbow_cache::{BoxError, QueryError, QueryKey, QueryObserver};
use oxbow_types::{EntityId, FieldOption, Page, PageRequest};
use std::sync::Arc;

const ROOT: &str = "machineRepair";

pub fn root_key() -> QueryKey {
    QueryKey::root(ROOT)
}

pub fn list_key(search: &MachineRepairSearch, page: PageRequest) -> QueryKey {
    QueryKey::root(ROOT)
        .push("list")
        .push(page.page)
        .push(page.size)
        .push(search_segment(search))
}

pub fn detail_key(id: EntityId) -> QueryKey {
    QueryKey::root(ROOT).push(id.as_i64())
}

pub fn fields_key(field_name: &str) -> QueryKey {
    QueryKey::root(ROOT).push("fields").push(field_name)
}

#[derive(Debug, Clone)]
pub struct MachineRepairQueries {
    client: Client,
    service: Arc<MachineRepairService>,
}

impl MachineRepairQueries {
    pub(crate) fn new(client: Client) -> Self {
        let service = Arc::new(MachineRepairService::new(Arc::clone(client.api())));
        MachineRepairQueries { client, service }
    }

    pub fn service(&self) -> &Arc<MachineRepairService> {
        &self.service
    }

    pub async fn list(
        &self,
        search: &MachineRepairSearch,
        page: PageRequest,
    ) -> Result<Arc<Page<MachineRepair>>, QueryError> {
        let key = list_key(search, page);
        self.client
            .cache()
            .fetch(&key, self.client.defaults(), || async {
                self.service.list(search, page).await.map_err(BoxError::from)
            })
            .await
    }

    pub async fn get(&self, id: EntityId) -> Result<Arc<MachineRepair>, QueryError> {
        let key = detail_key(id);
        self.client
            .cache()
            .fetch(&key, self.client.defaults(), || async move {
                self.service.get(id).await.map_err(BoxError::from)
            })
            .await
    }

    pub async fn fields(&self, field_name: &str) -> Result<Arc<Vec<FieldOption>>, QueryError> {
        let key = fields_key(field_name);
        self.client
            .cache()
            .fetch(&key, self.client.defaults(), || async {
                self.service.fields(field_name).await.map_err(BoxError::from)
            })
            .await
    }

    pub fn watch_list(
        &self,
        search: MachineRepairSearch,
        page: PageRequest,
    ) -> QueryObserver<Page<MachineRepair>> {
        let key = list_key(&search, page);
        let service = Arc::clone(&self.service);
        self.client
            .cache()
            .observe(key, self.client.defaults().clone(), move || {
                let service = Arc::clone(&service);
                let search = search.clone();
                async move { service.list(&search, page).await.map_err(BoxError::from) }
            })
    }

    pub async fn create(&self, request: &MachineRepairCreate) -> Result<MachineRepair, ApiError> {
        self.client
            .mutate(
                "machine repair create",
                &[root_key()],
                self.service.create(request),
            )
            .await
    }

    pub async fn create_batch(
        &self,
        requests: &[MachineRepairCreate],
    ) -> Result<Vec<MachineRepair>, ApiError> {
        self.client
            .mutate(
                "machine repair batch create",
                &[root_key()],
                self.service.create_batch(requests),
            )
            .await
    }

    pub async fn update(
        &self,
        id: EntityId,
        patch: &MachineRepairUpdate,
    ) -> Result<MachineRepair, ApiError> {
        self.client
            .mutate(
                "machine repair update",
                &[root_key()],
                self.service.update(id, patch),
            )
            .await
    }

    pub async fn delete(&self, ids: &[EntityId]) -> Result<(), ApiError> {
        self.client
            .mutate(
                "machine repair delete",
                &[root_key()],
                self.service.delete(ids),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_filters_reach_the_key() {
        use chrono::NaiveDate;

        let ranged = MachineRepairSearch {
            repair_date_from: NaiveDate::from_ymd_opt(2026, 1, 1),
            ..MachineRepairSearch::default()
        };

        let all = list_key(&MachineRepairSearch::default(), PageRequest::default());
        let filtered = list_key(&ranged, PageRequest::default());

        assert_ne!(all, filtered);
    }
}
