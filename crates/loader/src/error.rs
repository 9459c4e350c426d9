//! Typed error enum for the loader layer.

use thiserror::Error;
use timberdesk_client::RequestError;

#[derive(Debug, Error)]
pub enum LoadError {
    /// A page fetch failed; the walk was abandoned.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A newer `refetch`/`run` took over before this walk finished.
    #[error("walk superseded by a newer request")]
    Superseded,

    #[error("page size must be at least 1")]
    InvalidPageSize,
}

impl LoadError {
    #[must_use]
    pub const fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }

    /// Message shown in place of the data.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Request(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
