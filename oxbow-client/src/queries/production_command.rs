//! Cached production command queries
//!
//! Command mutations also invalidate the production plan prefix: plan
//! screens aggregate command progress, so their cached pages go stale at
//! the same time.

use super::{production_plan, search_segment};
use crate::client::Client;
use crate::error::ApiError;
use crate::services::production_command::{
    ProductionCommand, ProductionCommandCreate, ProductionCommandSearch, ProductionCommandService,
    ProductionCommandUpdate,
};
use oxbow_cache::{BoxError, QueryError, QueryKey, QueryObserver};
use oxbow_types::{EntityId, FieldOption, Page, PageRequest};
use std::sync::Arc;

const ROOT: &str = "productionCommand";

pub fn root_key() -> QueryKey {
    QueryKey::root(ROOT)
}

pub fn list_key(search: &ProductionCommandSearch, page: PageRequest) -> QueryKey {
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
pub struct ProductionCommandQueries {
    client: Client,
    service: Arc<ProductionCommandService>,
}

impl ProductionCommandQueries {
    pub(crate) fn new(client: Client) -> Self {
        let service = Arc::new(ProductionCommandService::new(Arc::clone(client.api())));
        ProductionCommandQueries { client, service }
    }

    pub fn service(&self) -> &Arc<ProductionCommandService> {
        &self.service
    }

    pub async fn list(
        &self,
        search: &ProductionCommandSearch,
        page: PageRequest,
    ) -> Result<Arc<Page<ProductionCommand>>, QueryError> {
        let key = list_key(search, page);
        self.client
            .cache()
            .fetch(&key, self.client.defaults(), || async {
                self.service.list(search, page).await.map_err(BoxError::from)
            })
            .await
    }

    pub async fn get(&self, id: EntityId) -> Result<Arc<ProductionCommand>, QueryError> {
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
        search: ProductionCommandSearch,
        page: PageRequest,
    ) -> QueryObserver<Page<ProductionCommand>> {
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

    pub async fn create(
        &self,
        request: &ProductionCommandCreate,
    ) -> Result<ProductionCommand, ApiError> {
        self.client
            .mutate(
                "production command create",
                &[root_key(), production_plan::root_key()],
                self.service.create(request),
            )
            .await
    }

    pub async fn create_batch(
        &self,
        requests: &[ProductionCommandCreate],
    ) -> Result<Vec<ProductionCommand>, ApiError> {
        self.client
            .mutate(
                "production command batch create",
                &[root_key(), production_plan::root_key()],
                self.service.create_batch(requests),
            )
            .await
    }

    pub async fn update(
        &self,
        id: EntityId,
        patch: &ProductionCommandUpdate,
    ) -> Result<ProductionCommand, ApiError> {
        self.client
            .mutate(
                "production command update",
                &[root_key(), production_plan::root_key()],
                self.service.update(id, patch),
            )
            .await
    }

    pub async fn delete(&self, ids: &[EntityId]) -> Result<(), ApiError> {
        self.client
            .mutate(
                "production command delete",
                &[root_key(), production_plan::root_key()],
                self.service.delete(ids),
            )
            .await
    }
}
