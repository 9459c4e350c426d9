//! Typed error enum for the client crate.

use serde_json::Value;
use thiserror::Error;

/// Errors from backend API operations.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String, detail: Option<String> },
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] timberdesk_core::CoreError),
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

/// User-facing classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Timeout,
    Validation,
    Unauthorized,
    NotFound,
    Server,
    Unknown,
}

impl ErrorKind {
    /// Classify an HTTP status code.
    #[must_use]
    pub const fn from_status(code: u16) -> Self {
        match code {
            400 | 422 => Self::Validation,
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            408 | 504 => Self::Timeout,
            500..=599 => Self::Server,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn message(&self) -> &'static str {
        match *self {
            Self::Network => "Network error: check your connection and try again.",
            Self::Timeout => "The request timed out. Please try again.",
            Self::Validation => "The submitted data is invalid.",
            Self::Unauthorized => "You are not authorized. Please log in again.",
            Self::NotFound => "The requested resource was not found.",
            Self::Server => "The server encountered an error. Please try again later.",
            Self::Unknown => "An unexpected error occurred.",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl RequestError {
    /// Build a status error, extracting the server's `detail` field when present.
    #[must_use]
    pub fn from_status(code: u16, body: String) -> Self {
        let detail = extract_detail(&body);
        Self::HttpStatus { code, body, detail }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(e) if e.is_timeout() => ErrorKind::Timeout,
            Self::Transport(e) if e.is_connect() || e.is_request() => ErrorKind::Network,
            Self::Transport(e) => e.status().map_or(ErrorKind::Network, |s| ErrorKind::from_status(s.as_u16())),
            Self::HttpStatus { code, .. } => ErrorKind::from_status(*code),
            Self::InvalidRequest(_) => ErrorKind::Validation,
            Self::JsonParse { .. }
            | Self::InvalidRecord(_)
            | Self::UnexpectedShape(_)
            | Self::ClientInit(_) => {
                ErrorKind::Unknown
            },
        }
    }

    /// HTTP status code, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { code, .. } => Some(*code),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Message suitable for an inline error banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        let kind = self.kind();
        match (kind, self) {
            (ErrorKind::Validation, Self::HttpStatus { detail: Some(detail), .. }) => {
                format!("{} {detail}", kind.message())
            },
            (ErrorKind::Validation, Self::InvalidRequest(reason)) => {
                format!("{} {reason}", kind.message())
            },
            _ => kind.message().to_owned(),
        }
    }
}

/// `{"detail": "..."}` or the list form `{"detail": [{"msg": "..."}]}`.
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let msgs: Vec<&str> =
                items.iter().filter_map(|i| i.get("msg").and_then(Value::as_str)).collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        },
        _ => None,
    }
}
