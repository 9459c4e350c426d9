//! Page-at-a-time view of one collection, for browsing rather than loading
//! everything.

use timberdesk_core::{Entity, Record, total_pages};

use crate::error::LoadError;
use crate::source::CatalogSource;
use crate::walk::clamp_page_size;

#[derive(Debug)]
pub struct PagedView<C> {
    source: C,
    entity: Entity,
    page: u64,
    page_size: u64,
    items: Vec<Record>,
    total: u64,
    error: Option<String>,
}

impl<C: CatalogSource> PagedView<C> {
    /// # Errors
    /// `InvalidPageSize` for zero; larger sizes are clamped.
    pub fn new(source: C, entity: Entity, page_size: u64) -> Result<Self, LoadError> {
        Ok(Self {
            source,
            entity,
            page: 0,
            page_size: clamp_page_size(page_size)?,
            items: Vec::new(),
            total: 0,
            error: None,
        })
    }

    /// Load the current page. On failure the previous items are kept and the
    /// message is stored in [`Self::error`].
    ///
    /// # Errors
    /// The request error.
    pub async fn load(&mut self) -> Result<(), LoadError> {
        let offset = self.page.saturating_mul(self.page_size);
        match self.source.list(self.entity, offset, self.page_size).await {
            Ok(page) => {
                self.items = page.items;
                self.total = page.total;
                self.error = None;
                Ok(())
            },
            Err(err) => {
                let err = LoadError::from(err);
                self.error = Some(err.user_message());
                Err(err)
            },
        }
    }

    /// # Errors
    /// The request error.
    pub async fn next_page(&mut self) -> Result<(), LoadError> {
        if !self.has_next() {
            return Ok(());
        }
        self.page += 1;
        self.load().await
    }

    /// # Errors
    /// The request error.
    pub async fn prev_page(&mut self) -> Result<(), LoadError> {
        if !self.has_prev() {
            return Ok(());
        }
        self.page -= 1;
        self.load().await
    }

    /// Jump to `page`, clamped to the last known page.
    ///
    /// # Errors
    /// The request error.
    pub async fn set_page(&mut self, page: u64) -> Result<(), LoadError> {
        let last = self.total_pages().saturating_sub(1);
        self.page = if self.total == 0 { page } else { page.min(last) };
        self.load().await
    }

    /// Change the page size and go back to page 0.
    ///
    /// # Errors
    /// `InvalidPageSize` for zero, or the request error.
    pub async fn set_page_size(&mut self, page_size: u64) -> Result<(), LoadError> {
        self.page_size = clamp_page_size(page_size)?;
        self.page = 0;
        self.load().await
    }

    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        total_pages(self.total, self.page_size)
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages()
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 0
    }

    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    #[must_use]
    pub fn items(&self) -> &[Record] {
        &self.items
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
