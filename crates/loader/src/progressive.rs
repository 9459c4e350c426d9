//! Progressive loader: one collection, every page, observable state.
//!
//! State lives in a `watch` channel. Each `refetch` starts a new generation;
//! every write is made inside the channel lock and only if the writer's
//! generation is still current, so an older walk can't touch the state of a
//! newer one.

use std::time::Duration;

use timberdesk_core::{DEFAULT_PAGE_DELAY_MS, Progress};
use tokio::sync::watch;

use crate::error::LoadError;
use crate::source::PageSource;
use crate::walk::{PageSink, clamp_page_size, walk_pages};

/// Snapshot of a loader, republished after every page.
#[derive(Debug, Clone)]
pub struct LoadState<T> {
    pub data: Vec<T>,
    pub progress: Progress,
    pub loading: bool,
    /// User-facing message of the last failed walk.
    pub error: Option<String>,
    pub generation: u64,
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self { data: Vec::new(), progress: Progress::zero(), loading: false, error: None, generation: 0 }
    }
}

pub struct ProgressiveLoader<T, S> {
    source: S,
    page_size: u64,
    pace: Duration,
    state: watch::Sender<LoadState<T>>,
}

impl<T, S> std::fmt::Debug for ProgressiveLoader<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ProgressiveLoader")
            .field("page_size", &self.page_size)
            .field("pace", &self.pace)
            .field("generation", &state.generation)
            .field("loaded", &state.data.len())
            .finish_non_exhaustive()
    }
}

struct StateSink<'a, T> {
    state: &'a watch::Sender<LoadState<T>>,
    generation: u64,
}

impl<T> PageSink<T> for StateSink<'_, T> {
    fn is_current(&self) -> bool {
        self.state.borrow().generation == self.generation
    }

    fn accept(&mut self, items: Vec<T>, progress: Progress) -> bool {
        let generation = self.generation;
        let mut current = false;
        self.state.send_if_modified(|s| {
            if s.generation != generation {
                return false;
            }
            current = true;
            s.data.extend(items);
            s.progress = progress;
            true
        });
        current
    }
}

impl<T, S> ProgressiveLoader<T, S>
where
    T: Clone + Send + Sync + 'static,
    S: PageSource<T>,
{
    /// # Errors
    /// `InvalidPageSize` for a zero page size. Sizes above the server ceiling
    /// are clamped.
    pub fn new(source: S, page_size: u64) -> Result<Self, LoadError> {
        Ok(Self {
            source,
            page_size: clamp_page_size(page_size)?,
            pace: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
            state: watch::Sender::new(LoadState::default()),
        })
    }

    /// Pause between page requests.
    #[must_use]
    pub const fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoadState<T>> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> LoadState<T> {
        self.state.borrow().clone()
    }

    /// Walk the collection from page 0, replacing any previous result.
    ///
    /// # Errors
    /// The failing page's error (state cleared, message published), or
    /// `Superseded` when another `refetch` started meanwhile.
    pub async fn refetch(&self) -> Result<Vec<T>, LoadError> {
        let mut generation = 0;
        self.state.send_modify(|s| {
            s.generation += 1;
            generation = s.generation;
            s.data.clear();
            s.progress = Progress::zero();
            s.loading = true;
            s.error = None;
        });
        tracing::debug!(generation, page_size = self.page_size, "progressive walk started");

        let mut sink = StateSink { state: &self.state, generation };
        let outcome = walk_pages(&self.source, self.page_size, self.pace, &mut sink).await;

        match outcome {
            Ok(summary) => {
                let mut data = None;
                self.state.send_if_modified(|s| {
                    if s.generation != generation {
                        return false;
                    }
                    s.loading = false;
                    data = Some(s.data.clone());
                    true
                });
                tracing::debug!(generation, pages = summary.pages, records = summary.records, "progressive walk finished");
                data.ok_or(LoadError::Superseded)
            },
            Err(LoadError::Superseded) => {
                tracing::debug!(generation, "progressive walk superseded");
                Err(LoadError::Superseded)
            },
            Err(err) => {
                let message = err.user_message();
                tracing::warn!(generation, error = %err, "progressive walk failed");
                self.state.send_if_modified(|s| {
                    if s.generation != generation {
                        return false;
                    }
                    s.data.clear();
                    s.progress = Progress::zero();
                    s.loading = false;
                    s.error = Some(message);
                    true
                });
                Err(err)
            },
        }
    }
}
