//! Core types for timberdesk
//!
//! Domain records, pagination primitives and export helpers shared by the
//! client, the loader and the CLI.

mod constants;
pub mod env_config;
mod entity;
mod error;
mod export;
mod models;
mod page;
mod record;

pub use constants::*;
pub use entity::Entity;
pub use error::*;
pub use export::{ExportFormat, default_export_file_name, export_records, to_csv};
pub use models::*;
pub use page::{Page, Progress, total_pages};
pub use record::Record;
