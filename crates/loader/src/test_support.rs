//! In-memory page sources for loader tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use timberdesk_client::RequestError;
use timberdesk_core::{Entity, Page, Record};
use tokio::sync::Notify;

use crate::source::{CatalogSource, PageSource};

type Mutation = Box<dyn Fn(u64, &mut Vec<u32>) + Send + Sync>;

/// Serves `0..n` in pages and records every requested page index.
pub(crate) struct VecSource {
    rows: Mutex<Vec<u32>>,
    requests: Mutex<Vec<(u64, u64)>>,
    fail_at: Option<u64>,
    fail_once: bool,
    failed: AtomicBool,
    before_fetch: Option<Mutation>,
}

impl VecSource {
    pub(crate) fn new(n: u32) -> Self {
        Self {
            rows: Mutex::new((0..n).collect()),
            requests: Mutex::new(Vec::new()),
            fail_at: None,
            fail_once: false,
            failed: AtomicBool::new(false),
            before_fetch: None,
        }
    }

    pub(crate) fn failing_at(mut self, page: u64) -> Self {
        self.fail_at = Some(page);
        self
    }

    pub(crate) fn failing_once_at(mut self, page: u64) -> Self {
        self.fail_at = Some(page);
        self.fail_once = true;
        self
    }

    /// Mutate the backing rows before serving a page, to simulate concurrent writers.
    pub(crate) fn mutating(mut self, f: impl Fn(u64, &mut Vec<u32>) + Send + Sync + 'static) -> Self {
        self.before_fetch = Some(Box::new(f));
        self
    }

    pub(crate) fn requests(&self) -> Vec<(u64, u64)> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn requested_pages(&self) -> Vec<u64> {
        self.requests().into_iter().map(|(page, _)| page).collect()
    }
}

pub(crate) fn server_error() -> RequestError {
    RequestError::from_status(500, r#"{"detail": "boom"}"#.to_owned())
}

#[async_trait]
impl PageSource<u32> for VecSource {
    async fn fetch_page(&self, page: u64, page_size: u64) -> Result<Page<u32>, RequestError> {
        self.requests.lock().unwrap().push((page, page_size));
        if self.fail_at == Some(page) {
            let already_failed = self.failed.swap(true, Ordering::SeqCst);
            if !(self.fail_once && already_failed) {
                return Err(server_error());
            }
        }
        let mut rows = self.rows.lock().unwrap();
        if let Some(mutate) = &self.before_fetch {
            mutate(page, &mut rows);
        }
        let start = usize::try_from(page * page_size).unwrap().min(rows.len());
        let end = (start + usize::try_from(page_size).unwrap()).min(rows.len());
        Ok(Page {
            items: rows[start..end].to_vec(),
            total: rows.len() as u64,
            offset: page * page_size,
            limit: page_size,
        })
    }
}

/// Wraps a source and parks the first request for `page` until released.
pub(crate) struct GatedSource {
    inner: VecSource,
    page: u64,
    parked: AtomicBool,
    pub(crate) entered: Notify,
    pub(crate) release: Notify,
}

impl GatedSource {
    pub(crate) fn new(inner: VecSource, page: u64) -> Self {
        Self { inner, page, parked: AtomicBool::new(false), entered: Notify::new(), release: Notify::new() }
    }
}

#[async_trait]
impl PageSource<u32> for GatedSource {
    async fn fetch_page(&self, page: u64, page_size: u64) -> Result<Page<u32>, RequestError> {
        if page == self.page && !self.parked.swap(true, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.fetch_page(page, page_size).await
    }
}

/// Multi-collection backend with optional failing collections.
#[derive(Default)]
pub(crate) struct FakeCatalog {
    collections: HashMap<Entity, Vec<Value>>,
    failing: Mutex<HashSet<Entity>>,
    requests: Mutex<Vec<(Entity, u64)>>,
}

impl FakeCatalog {
    pub(crate) fn with(mut self, entity: Entity, rows: Vec<Value>) -> Self {
        self.collections.insert(entity, rows);
        self
    }

    pub(crate) fn failing(self, entity: Entity) -> Self {
        self.start_failing(entity);
        self
    }

    pub(crate) fn start_failing(&self, entity: Entity) {
        self.failing.lock().unwrap().insert(entity);
    }

    pub(crate) fn requests(&self) -> Vec<(Entity, u64)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn fetch_page(
        &self,
        entity: Entity,
        page: u64,
        page_size: u64,
    ) -> Result<Page<Record>, RequestError> {
        self.requests.lock().unwrap().push((entity, page));
        if self.failing.lock().unwrap().contains(&entity) {
            return Err(server_error());
        }
        let rows = self.collections.get(&entity).cloned().unwrap_or_default();
        let start = usize::try_from(page * page_size).unwrap().min(rows.len());
        let end = (start + usize::try_from(page_size).unwrap()).min(rows.len());
        let items = rows[start..end]
            .iter()
            .cloned()
            .map(|v| Record::decode(entity, v))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page { items, total: rows.len() as u64, offset: page * page_size, limit: page_size })
    }
}
