//! Cached vendor queries

use super::search_segment;
use crate::client::Client;
use crate::error::ApiError;
use crate::services::vendor::{
    Vendor, VendorCreate, VendorSearch, VendorService, VendorUpdate,
};
use oxbow_cache::{BoxError, QueryError, QueryKey, QueryObserver};
use oxbow_types::{EntityId, FieldOption, Page, PageRequest};
use std::sync::Arc;

const ROOT: &str = "vendor";

pub fn root_key() -> QueryKey {
    QueryKey::root(ROOT)
}

pub fn list_key(search: &VendorSearch, page: PageRequest) -> QueryKey {
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
pub struct VendorQueries {
    client: Client,
    service: Arc<VendorService>,
}

impl VendorQueries {
    pub(crate) fn new(client: Client) -> Self {
        let service = Arc::new(VendorService::new(Arc::clone(client.api())));
        VendorQueries { client, service }
    }

    /// The underlying uncached service
    pub fn service(&self) -> &Arc<VendorService> {
        &self.service
    }

    pub async fn list(
        &self,
        search: &VendorSearch,
        page: PageRequest,
    ) -> Result<Arc<Page<Vendor>>, QueryError> {
        let key = list_key(search, page);
        self.client
            .cache()
            .fetch(&key, self.client.defaults(), || async {
                self.service.list(search, page).await.map_err(BoxError::from)
            })
            .await
    }

    pub async fn get(&self, id: EntityId) -> Result<Arc<Vendor>, QueryError> {
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

    /// Observe a list page; refetches whenever the vendor prefix is invalidated
    pub fn watch_list(
        &self,
        search: VendorSearch,
        page: PageRequest,
    ) -> QueryObserver<Page<Vendor>> {
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

    pub async fn create(&self, request: &VendorCreate) -> Result<Vendor, ApiError> {
        self.client
            .mutate("vendor create", &[root_key()], self.service.create(request))
            .await
    }

    pub async fn create_batch(&self, requests: &[VendorCreate]) -> Result<Vec<Vendor>, ApiError> {
        self.client
            .mutate(
                "vendor batch create",
                &[root_key()],
                self.service.create_batch(requests),
            )
            .await
    }

    pub async fn update(&self, id: EntityId, patch: &VendorUpdate) -> Result<Vendor, ApiError> {
        self.client
            .mutate("vendor update", &[root_key()], self.service.update(id, patch))
            .await
    }

    pub async fn delete(&self, ids: &[EntityId]) -> Result<(), ApiError> {
        self.client
            .mutate("vendor delete", &[root_key()], self.service.delete(ids))
            .await
    }
}
