use std::io;
use std::result::Result as StdResult;

use thiserror::Error;

/// Errors that can occur in timberdesk core types
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Unknown export format: {0}")]
    UnknownExportFormat(String),

    #[error("Invalid record for {entity}: {source}")]
    InvalidRecord {
        entity: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = StdResult<T, CoreError>;
