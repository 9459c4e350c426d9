use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Url};
use serde_json::Value;
use timberdesk_core::{API_PREFIX, Entity, EntityRecord, Page, Record};

use crate::cache::{ResponseCache, cache_key};
use crate::config::ClientConfig;
use crate::error::RequestError;
use crate::wire::{denormalize_outbound, normalize_inbound, unwrap_page, unwrap_single};

/// Path of the whole-dataset dump endpoint.
pub const DATABASE_EXPORT_PATH: &str = "/database/export/";
/// Path of the whole-dataset restore endpoint.
pub const DATABASE_IMPORT_PATH: &str = "/database/import/";

/// Client for the marketplace REST API.
pub struct ApiClient {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
    pub(crate) max_page_size: u64,
    pub(crate) page_delay: Duration,
    pub(crate) cache: Arc<ResponseCache>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("client", &self.client)
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("max_page_size", &self.max_page_size)
            .field("page_delay", &self.page_delay)
            .field("cached_entries", &self.cache.len())
            .finish()
    }
}

impl ApiClient {
    /// Creates a client sharing `cache` with any other client built from it.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(config: &ClientConfig, cache: Arc<ResponseCache>) -> Result<Self, RequestError> {
        let base_url = config.base_url.trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RequestError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
            max_page_size: config.max_page_size,
            page_delay: config.page_delay,
            cache,
        })
    }

    /// Sets the bearer token sent with every request.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    #[must_use]
    pub const fn max_page_size(&self) -> u64 {
        self.max_page_size
    }

    #[must_use]
    pub const fn page_delay(&self) -> Duration {
        self.page_delay
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json(&self, builder: RequestBuilder, context: &str) -> Result<Value, RequestError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), context, "request rejected");
            return Err(RequestError::from_status(status.as_u16(), body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| RequestError::JsonParse {
            context: format!("{context} (body: {})", truncate(&body, 200)),
            source: e,
        })
    }

    /// GET `path`, writing the body to the cache. With `use_cache`, a fresh
    /// cached body is returned without touching the network.
    async fn get_json(
        &self,
        path: &str,
        params: &[(&str, String)],
        use_cache: bool,
    ) -> Result<Value, RequestError> {
        self.get_url(&self.url(path), params, use_cache, path).await
    }

    async fn get_url(
        &self,
        url: &str,
        params: &[(&str, String)],
        use_cache: bool,
        context: &str,
    ) -> Result<Value, RequestError> {
        let key = cache_key(url, params);
        if use_cache {
            if let Some(hit) = self.cache.get(&key) {
                tracing::debug!(%key, "cache hit");
                return Ok(hit);
            }
        }

        tracing::debug!(%url, ?params, "GET");
        let value = self.send_json(self.request(Method::GET, url).query(params), context).await?;
        self.cache.set(key, value.clone());
        Ok(value)
    }

    /// URL of one record. The id is percent-encoded as a single path segment
    /// so it can never address another collection.
    fn item_url(&self, entity: Entity, id: &str) -> Result<String, RequestError> {
        if matches!(id, "" | "." | "..") {
            return Err(RequestError::InvalidRequest(format!("invalid {entity} id {id:?}")));
        }
        let mut url = Url::parse(&self.url(&entity.collection_path()))
            .map_err(|e| RequestError::InvalidRequest(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| RequestError::InvalidRequest(format!("base URL {} has no path", self.base_url)))?
            .pop_if_empty()
            .push(id);
        Ok(url.into())
    }

    fn invalidate(&self, entity: Entity) {
        let dropped = self.cache.invalidate_prefix(&self.url(&entity.collection_path()));
        tracing::debug!(%entity, dropped, "invalidated cached responses");
    }

    /// Reject a `limit` outside `1..=max_page_size`.
    ///
    /// # Errors
    /// Returns `InvalidRequest` naming the offending size.
    pub fn validate_page_size(&self, page_size: u64) -> Result<(), RequestError> {
        if page_size == 0 || page_size > self.max_page_size {
            return Err(RequestError::InvalidRequest(format!(
                "page size must be between 1 and {}, got {page_size}",
                self.max_page_size
            )));
        }
        Ok(())
    }

    async fn window(
        &self,
        entity: Entity,
        offset: u64,
        limit: u64,
        use_cache: bool,
    ) -> Result<Page<Value>, RequestError> {
        self.validate_page_size(limit)?;
        let params = [("offset", offset.to_string()), ("limit", limit.to_string())];
        let body = self.get_json(&entity.collection_path(), &params, use_cache).await?;
        let mut page = unwrap_page(body, offset, limit)?;
        for item in &mut page.items {
            normalize_inbound(entity, item);
        }
        Ok(page)
    }

    /// Fetch page `page` of `entity` as normalized JSON objects. Always hits
    /// the network.
    ///
    /// # Errors
    /// Fails on an out-of-range page size, transport failure, non-2xx status
    /// or an unexpected envelope.
    pub async fn fetch_raw_page(
        &self,
        entity: Entity,
        page: u64,
        page_size: u64,
    ) -> Result<Page<Value>, RequestError> {
        let offset = page.checked_mul(page_size).ok_or_else(|| {
            RequestError::InvalidRequest(format!("page {page} overflows the offset range"))
        })?;
        self.window(entity, offset, page_size, false).await
    }

    /// Fetch page `page` of `entity` as records.
    ///
    /// # Errors
    /// As [`Self::fetch_raw_page`], plus `InvalidRecord` for undecodable items.
    pub async fn fetch_page(
        &self,
        entity: Entity,
        page: u64,
        page_size: u64,
    ) -> Result<Page<Record>, RequestError> {
        let raw = self.fetch_raw_page(entity, page, page_size).await?;
        Ok(raw.try_map(|v| Record::decode(entity, v))?)
    }

    /// Fetch page `page` of `T`'s collection.
    ///
    /// # Errors
    /// As [`Self::fetch_raw_page`], plus `JsonParse` for undecodable items.
    pub async fn fetch_typed_page<T: EntityRecord>(
        &self,
        page: u64,
        page_size: u64,
    ) -> Result<Page<T>, RequestError> {
        let raw = self.fetch_raw_page(T::ENTITY, page, page_size).await?;
        raw.try_map(|v| {
            serde_json::from_value(v).map_err(|e| RequestError::JsonParse {
                context: format!("{} record", T::ENTITY),
                source: e,
            })
        })
    }

    /// Single-shot read of one window, served from the cache while fresh.
    ///
    /// # Errors
    /// As [`Self::fetch_page`].
    pub async fn list(
        &self,
        entity: Entity,
        offset: u64,
        limit: u64,
    ) -> Result<Page<Record>, RequestError> {
        let raw = self.window(entity, offset, limit, true).await?;
        Ok(raw.try_map(|v| Record::decode(entity, v))?)
    }

    /// # Errors
    /// `NotFound`-classified error when the id doesn't exist.
    pub async fn get(&self, entity: Entity, id: &str) -> Result<Record, RequestError> {
        let url = self.item_url(entity, id)?;
        let body = self.get_url(&url, &[], true, "get").await?;
        decode_single(entity, body)
    }

    /// Create a record from a body using model field names.
    ///
    /// # Errors
    /// Validation-classified error when the backend rejects the body.
    pub async fn create(&self, entity: Entity, body: Value) -> Result<Record, RequestError> {
        let mut body = body;
        denormalize_outbound(entity, &mut body);
        let url = self.url(&entity.collection_path());
        tracing::debug!(%url, "POST");
        let response = self.send_json(self.request(Method::POST, &url).json(&body), "create").await?;
        self.invalidate(entity);
        decode_single(entity, response)
    }

    /// Partially update a record.
    ///
    /// # Errors
    /// Validation- or NotFound-classified error from the backend.
    pub async fn update(&self, entity: Entity, id: &str, patch: Value) -> Result<Record, RequestError> {
        let mut patch = patch;
        denormalize_outbound(entity, &mut patch);
        let url = self.item_url(entity, id)?;
        tracing::debug!(%url, "PATCH");
        let response =
            self.send_json(self.request(Method::PATCH, &url).json(&patch), "update").await?;
        self.invalidate(entity);
        decode_single(entity, response)
    }

    /// # Errors
    /// NotFound-classified error when the id doesn't exist.
    pub async fn delete(&self, entity: Entity, id: &str) -> Result<(), RequestError> {
        let url = self.item_url(entity, id)?;
        tracing::debug!(%url, "DELETE");
        self.send_json(self.request(Method::DELETE, &url), "delete").await?;
        self.invalidate(entity);
        Ok(())
    }

    /// Download the backend's JSON dump of the whole dataset.
    ///
    /// # Errors
    /// Any request failure.
    pub async fn export_database(&self) -> Result<Value, RequestError> {
        self.get_json(&format!("{API_PREFIX}{DATABASE_EXPORT_PATH}"), &[], false).await
    }

    /// Upload a dump produced by [`Self::export_database`]. Clears the cache.
    ///
    /// # Errors
    /// Any request failure.
    pub async fn import_database(&self, dump: &Value) -> Result<Value, RequestError> {
        let url = self.url(&format!("{API_PREFIX}{DATABASE_IMPORT_PATH}"));
        tracing::info!(%url, "importing database dump");
        let response = self.send_json(self.request(Method::POST, &url).json(dump), "import").await?;
        self.cache.clear();
        Ok(response)
    }
}

fn decode_single(entity: Entity, body: Value) -> Result<Record, RequestError> {
    let mut value = unwrap_single(body);
    if !value.is_object() {
        return Err(RequestError::UnexpectedShape(format!("{entity} response is not an object")));
    }
    normalize_inbound(entity, &mut value);
    Ok(Record::decode(entity, value)?)
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
