//! Sequential "load every page" walk.
//!
//! The page count is fixed by the `total` of page 0. Later pages reporting a
//! different `total` are logged and otherwise ignored, and an empty page
//! before the planned end finishes the walk early. Either way the walk ends
//! at 100% and never issues more than `ceil(total / page_size)` requests.

use std::time::Duration;

use timberdesk_core::{MAX_PAGE_SIZE, Progress, total_pages};

use crate::error::LoadError;
use crate::source::PageSource;

/// Receives each page of a walk in order.
pub trait PageSink<T> {
    /// Checked before each request; `false` abandons the walk.
    fn is_current(&self) -> bool {
        true
    }

    /// Takes one page and the progress after it. `false` abandons the walk.
    fn accept(&mut self, items: Vec<T>, progress: Progress) -> bool;
}

impl<T, F> PageSink<T> for F
where
    F: FnMut(Vec<T>, Progress) -> bool,
{
    fn accept(&mut self, items: Vec<T>, progress: Progress) -> bool {
        self(items, progress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkSummary {
    /// Requests issued.
    pub pages: u64,
    /// Records delivered to the sink.
    pub records: u64,
    /// `total` reported by page 0.
    pub reported_total: u64,
}

/// Clamp a requested page size to the server ceiling.
///
/// # Errors
/// `InvalidPageSize` for zero.
pub fn clamp_page_size(requested: u64) -> Result<u64, LoadError> {
    match requested {
        0 => Err(LoadError::InvalidPageSize),
        n if n > MAX_PAGE_SIZE => {
            tracing::warn!(requested = n, max = MAX_PAGE_SIZE, "page size clamped to server maximum");
            Ok(MAX_PAGE_SIZE)
        },
        n => Ok(n),
    }
}

/// Fetch every page of `source` strictly in sequence.
///
/// # Errors
/// The first failed fetch aborts the walk with `LoadError::Request`; a sink
/// that stops being current yields `LoadError::Superseded`.
pub async fn walk_pages<T, S, K>(
    source: &S,
    page_size: u64,
    pace: Duration,
    sink: &mut K,
) -> Result<WalkSummary, LoadError>
where
    T: Send + 'static,
    S: PageSource<T> + ?Sized,
    K: PageSink<T> + Send + ?Sized,
{
    if page_size == 0 {
        return Err(LoadError::InvalidPageSize);
    }
    if !sink.is_current() {
        return Err(LoadError::Superseded);
    }

    let first = source.fetch_page(0, page_size).await?;
    let reported_total = first.total;
    let planned = total_pages(reported_total, page_size);

    if reported_total == 0 {
        if !first.items.is_empty() {
            tracing::warn!(items = first.items.len(), "page 0 reported total 0 but carried items");
        }
        if !sink.accept(Vec::new(), Progress::complete(0)) {
            return Err(LoadError::Superseded);
        }
        return Ok(WalkSummary { pages: 1, records: 0, reported_total });
    }

    let mut records = first.items.len() as u64;
    if !sink.accept(first.items, Progress::at(1, planned)) {
        return Err(LoadError::Superseded);
    }

    for page in 1..planned {
        if !pace.is_zero() {
            tokio::time::sleep(pace).await;
        }
        if !sink.is_current() {
            return Err(LoadError::Superseded);
        }

        let next = source.fetch_page(page, page_size).await?;
        if next.total != reported_total {
            tracing::warn!(
                page,
                initial_total = reported_total,
                total = next.total,
                "collection changed during walk, keeping initial page count"
            );
        }
        if next.items.is_empty() {
            tracing::warn!(page, planned, "empty page before planned end, finishing walk early");
            if !sink.accept(Vec::new(), Progress::complete(planned)) {
                return Err(LoadError::Superseded);
            }
            return Ok(WalkSummary { pages: page + 1, records, reported_total });
        }

        records += next.items.len() as u64;
        if !sink.accept(next.items, Progress::at(page + 1, planned)) {
            return Err(LoadError::Superseded);
        }
    }

    tracing::debug!(pages = planned, records, "walk complete");
    Ok(WalkSummary { pages: planned, records, reported_total })
}
