//! REST client for the marketplace backend
//!
//! Translates logical page requests into `offset`/`limit` GETs, unwraps the
//! server envelope, maps misspelled wire fields, caches GET bodies and
//! classifies failures into user-presentable messages.

mod cache;
mod client;
mod config;
pub mod error;
pub mod wire;


pub use cache::{ResponseCache, cache_key};
pub use client::{ApiClient, DATABASE_EXPORT_PATH, DATABASE_IMPORT_PATH, truncate};
pub use config::ClientConfig;
pub use error::{ErrorKind, RequestError};
