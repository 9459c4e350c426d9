//! Page-fetch seams used by the walkers.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use timberdesk_client::{ApiClient, RequestError};
use timberdesk_core::{Entity, EntityRecord, Page, Record};

/// Fetches pages of one collection.
#[async_trait]
pub trait PageSource<T: Send + 'static>: Send + Sync {
    async fn fetch_page(&self, page: u64, page_size: u64) -> Result<Page<T>, RequestError>;
}

/// Fetches pages of any collection.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fresh page from the backend.
    async fn fetch_page(
        &self,
        entity: Entity,
        page: u64,
        page_size: u64,
    ) -> Result<Page<Record>, RequestError>;

    /// Single-shot window read; implementations may serve it from a cache.
    async fn list(&self, entity: Entity, offset: u64, limit: u64) -> Result<Page<Record>, RequestError> {
        if limit == 0 {
            return Err(RequestError::InvalidRequest("limit must be at least 1".to_owned()));
        }
        self.fetch_page(entity, offset / limit, limit).await
    }
}

#[async_trait]
impl CatalogSource for ApiClient {
    async fn fetch_page(
        &self,
        entity: Entity,
        page: u64,
        page_size: u64,
    ) -> Result<Page<Record>, RequestError> {
        ApiClient::fetch_page(self, entity, page, page_size).await
    }

    async fn list(&self, entity: Entity, offset: u64, limit: u64) -> Result<Page<Record>, RequestError> {
        ApiClient::list(self, entity, offset, limit).await
    }
}

#[async_trait]
impl<C: CatalogSource + ?Sized> CatalogSource for Arc<C> {
    async fn fetch_page(
        &self,
        entity: Entity,
        page: u64,
        page_size: u64,
    ) -> Result<Page<Record>, RequestError> {
        (**self).fetch_page(entity, page, page_size).await
    }

    async fn list(&self, entity: Entity, offset: u64, limit: u64) -> Result<Page<Record>, RequestError> {
        (**self).list(entity, offset, limit).await
    }
}

#[async_trait]
impl<C: CatalogSource + ?Sized> CatalogSource for &C {
    async fn fetch_page(
        &self,
        entity: Entity,
        page: u64,
        page_size: u64,
    ) -> Result<Page<Record>, RequestError> {
        (**self).fetch_page(entity, page, page_size).await
    }

    async fn list(&self, entity: Entity, offset: u64, limit: u64) -> Result<Page<Record>, RequestError> {
        (**self).list(entity, offset, limit).await
    }
}

/// One collection of a [`CatalogSource`].
#[derive(Debug, Clone)]
pub struct EntityPages<C> {
    source: C,
    entity: Entity,
}

impl<C: CatalogSource> EntityPages<C> {
    #[must_use]
    pub const fn new(source: C, entity: Entity) -> Self {
        Self { source, entity }
    }

    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.entity
    }
}

#[async_trait]
impl<C: CatalogSource> PageSource<Record> for EntityPages<C> {
    async fn fetch_page(&self, page: u64, page_size: u64) -> Result<Page<Record>, RequestError> {
        self.source.fetch_page(self.entity, page, page_size).await
    }
}

/// Typed pages of `T`'s collection.
pub struct Collection<T> {
    client: Arc<ApiClient>,
    _record: PhantomData<fn() -> T>,
}

impl<T: EntityRecord> Collection<T> {
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client, _record: PhantomData }
    }
}

#[async_trait]
impl<T: EntityRecord> PageSource<T> for Collection<T> {
    async fn fetch_page(&self, page: u64, page_size: u64) -> Result<Page<T>, RequestError> {
        self.client.fetch_typed_page::<T>(page, page_size).await
    }
}

#[async_trait]
impl<T: Send + 'static, S: PageSource<T> + ?Sized> PageSource<T> for Arc<S> {
    async fn fetch_page(&self, page: u64, page_size: u64) -> Result<Page<T>, RequestError> {
        (**self).fetch_page(page, page_size).await
    }
}
