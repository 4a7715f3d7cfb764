//! Cached mold instance queries
//!
//! Input and collect change which instances sit in a production command, so
//! those mutations invalidate the production command prefix as well.

use super::search_segment;
use crate::client::Client;
use crate::error::ApiError;
use crate::services::mold_instance::{
    MoldCollectRequest, MoldInputRequest, MoldInstance, MoldInstanceCreate, MoldInstanceSearch,
    MoldInstanceService, MoldInstanceUpdate,
};
use oxbow_cache::{BoxError, QueryError, QueryKey, QueryObserver};
use oxbow_types::{EntityId, FieldOption, Page, PageRequest};
use std::sync::Arc;

const ROOT: &str = "moldInstance";

pub fn root_key() -> QueryKey {
    QueryKey::root(ROOT)
}

pub fn list_key(search: &MoldInstanceSearch, page: PageRequest) -> QueryKey {
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
pub struct MoldInstanceQueries {
    client: Client,
    service: Arc<MoldInstanceService>,
}

impl MoldInstanceQueries {
    pub(crate) fn new(client: Client) -> Self {
        let service = Arc::new(MoldInstanceService::new(Arc::clone(client.api())));
        MoldInstanceQueries { client, service }
    }

    pub fn service(&self) -> &Arc<MoldInstanceService> {
        &self.service
    }

    pub async fn list(
        &self,
        search: &MoldInstanceSearch,
        page: PageRequest,
    ) -> Result<Arc<Page<MoldInstance>>, QueryError> {
        let key = list_key(search, page);
        self.client
            .cache()
            .fetch(&key, self.client.defaults(), || async {
                self.service.list(search, page).await.map_err(BoxError::from)
            })
            .await
    }

    pub async fn get(&self, id: EntityId) -> Result<Arc<MoldInstance>, QueryError> {
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
        search: MoldInstanceSearch,
        page: PageRequest,
    ) -> QueryObserver<Page<MoldInstance>> {
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

    pub async fn create(&self, request: &MoldInstanceCreate) -> Result<MoldInstance, ApiError> {
        self.client
            .mutate(
                "mold instance create",
                &[root_key()],
                self.service.create(request),
            )
            .await
    }

    pub async fn create_batch(
        &self,
        requests: &[MoldInstanceCreate],
    ) -> Result<Vec<MoldInstance>, ApiError> {
        self.client
            .mutate(
                "mold instance batch create",
                &[root_key()],
                self.service.create_batch(requests),
            )
            .await
    }

    pub async fn update(
        &self,
        id: EntityId,
        patch: &MoldInstanceUpdate,
    ) -> Result<MoldInstance, ApiError> {
        self.client
            .mutate(
                "mold instance update",
                &[root_key()],
                self.service.update(id, patch),
            )
            .await
    }

    pub async fn delete(&self, ids: &[EntityId]) -> Result<(), ApiError> {
        self.client
            .mutate(
                "mold instance delete",
                &[root_key()],
                self.service.delete(ids),
            )
            .await
    }

    /// Put instances into a production command
    pub async fn input(&self, request: &MoldInputRequest) -> Result<(), ApiError> {
        self.client
            .mutate(
                "mold input",
                &[root_key(), QueryKey::root("productionCommand")],
                self.service.input(request),
            )
            .await
    }

    /// Take instances back out of production
    pub async fn collect(&self, request: &MoldCollectRequest) -> Result<(), ApiError> {
        self.client
            .mutate(
                "mold collect",
                &[root_key(), QueryKey::root("productionCommand")],
                self.service.collect(request),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtered_lists_get_distinct_keys() {
        let input_only = MoldInstanceSearch {
            is_input: Some(true),
            ..MoldInstanceSearch::default()
        };

        let all = list_key(&MoldInstanceSearch::default(), PageRequest::default());
        let filtered = list_key(&input_only, PageRequest::default());

        assert_ne!(all, filtered);
        assert!(root_key().is_prefix_of(&all));
        assert!(root_key().is_prefix_of(&filtered));
    }
}
