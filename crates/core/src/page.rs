//! Normalized page of a collection and walk progress.

use serde::{Deserialize, Serialize};

/// One window of a collection as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in the requested offset window, in server order.
    pub items: Vec<T>,
    /// Number of matching records on the server at fetch time.
    pub total: u64,
    /// Offset from the start.
    pub offset: u64,
    /// Maximum items per page.
    pub limit: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn empty(offset: u64, limit: u64) -> Self {
        Self { items: Vec::new(), total: 0, offset, limit }
    }

    /// Convert every item, keeping the window metadata.
    ///
    /// # Errors
    /// Returns the first conversion error.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        let items = self.items.into_iter().map(f).collect::<Result<Vec<_>, _>>()?;
        Ok(Page { items, total: self.total, offset: self.offset, limit: self.limit })
    }
}

/// Number of pages needed to cover `total` records, `ceil(total / page_size)`.
#[must_use]
pub const fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Page-level progress of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Pages fetched so far.
    pub current: u64,
    /// Pages planned.
    pub total: u64,
    /// `current / total * 100`; 100 for an empty collection.
    pub percentage: f64,
}

impl Progress {
    #[must_use]
    pub const fn zero() -> Self {
        Self { current: 0, total: 0, percentage: 0.0 }
    }

    #[must_use]
    pub fn at(current: u64, total: u64) -> Self {
        if total == 0 {
            return Self::complete(0);
        }
        let current = current.min(total);
        #[allow(clippy::cast_precision_loss, reason = "page counts are far below 2^52")]
        let percentage = current as f64 / total as f64 * 100.0;
        Self { current, total, percentage }
    }

    #[must_use]
    pub const fn complete(total_pages: u64) -> Self {
        Self { current: total_pages, total: total_pages, percentage: 100.0 }
    }

    /// Fraction in `0.0..=1.0`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        self.percentage / 100.0
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.percentage >= 100.0
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::zero()
    }
}
