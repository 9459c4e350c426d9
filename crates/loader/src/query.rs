//! Single-shot request with cancel-and-restart semantics.
//!
//! `run` aborts whatever request the handle still has in flight before
//! starting the new one, and dropping the handle aborts it too. Results of an
//! aborted request are never published, even if it completed in the window
//! between the abort and its task stopping.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use timberdesk_client::RequestError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub generation: u64,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self { data: None, loading: false, error: None, generation: 0 }
    }
}

pub struct QueryHandle<T> {
    state: Arc<watch::Sender<QueryState<T>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<T> std::fmt::Debug for QueryHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("QueryHandle")
            .field("generation", &state.generation)
            .field("loading", &state.loading)
            .finish_non_exhaustive()
    }
}

impl<T: Send + Sync + 'static> Default for QueryHandle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> QueryHandle<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { state: Arc::new(watch::Sender::new(QueryState::default())), task: Mutex::new(None) }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> QueryState<T>
    where
        T: Clone,
    {
        self.state.borrow().clone()
    }

    fn replace_task(&self, next: Option<JoinHandle<()>>) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = std::mem::replace(&mut *task, next) {
            previous.abort();
        }
    }

    /// Start `request`, aborting the previous one. Must be called inside a
    /// Tokio runtime.
    pub fn run<F>(&self, request: F)
    where
        F: Future<Output = Result<T, RequestError>> + Send + 'static,
    {
        self.replace_task(None);

        let mut generation = 0;
        self.state.send_modify(|s| {
            s.generation += 1;
            generation = s.generation;
            s.loading = true;
            s.error = None;
        });

        let state = Arc::clone(&self.state);
        let task = tokio::spawn(async move {
            let result = request.await;
            state.send_if_modified(|s| {
                if s.generation != generation {
                    return false;
                }
                s.loading = false;
                match result {
                    Ok(data) => {
                        s.data = Some(data);
                        s.error = None;
                    },
                    Err(err) => {
                        tracing::debug!(error = %err, "query failed");
                        s.data = None;
                        s.error = Some(err.user_message());
                    },
                }
                true
            });
        });
        self.replace_task(Some(task));
    }

    /// Abort the in-flight request, keeping the last published data.
    pub fn cancel(&self) {
        self.replace_task(None);
        self.state.send_modify(|s| {
            s.generation += 1;
            s.loading = false;
        });
    }
}

impl<T> Drop for QueryHandle<T> {
    fn drop(&mut self) {
        let task = self.task.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = task.take() {
            task.abort();
        }
    }
}
