//! Loading layer for timberdesk
//!
//! Progressive all-pages loading, per-collection dashboard statistics,
//! cancellable single-shot queries and page-at-a-time browsing, all on top
//! of the page-fetch seams in [`source`].

mod error;
mod paged;
mod progressive;
mod query;
pub mod source;
mod stats;
pub mod walk;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod walk_tests;
#[cfg(test)]
mod progressive_tests;
#[cfg(test)]
mod stats_tests;

pub use error::LoadError;
pub use paged::PagedView;
pub use progressive::{LoadState, ProgressiveLoader};
pub use query::{QueryHandle, QueryState};
pub use source::{CatalogSource, Collection, EntityPages, PageSource};
pub use stats::{AggregateProgress, EntitySummary, EntityStats, StatsAggregator, StatsReport};
pub use walk::{PageSink, WalkSummary, walk_pages};
