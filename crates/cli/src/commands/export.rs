use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use timberdesk_client::ApiClient;
use timberdesk_core::{Entity, ExportFormat, default_export_file_name, export_records};

use super::UserFacing;
use super::fetch_all::load_all;

pub(crate) async fn run_export(
    client: Arc<ApiClient>,
    entity: Entity,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let page_size = client.max_page_size();
    let records = load_all(client, entity, page_size).await?;
    let body = export_records(&records, format)?;
    let path = output.unwrap_or_else(|| PathBuf::from(default_export_file_name(entity, format)));
    std::fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Exported {} {} records to {}", records.len(), entity, path.display());
    Ok(())
}

pub(crate) async fn run_db_export(client: &ApiClient, output: &Path) -> Result<()> {
    let dump = client.export_database().await.user_facing()?;
    std::fs::write(output, serde_json::to_string_pretty(&dump)?)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Database dump saved to {}", output.display());
    Ok(())
}

pub(crate) async fn run_db_import(client: &ApiClient, file: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let dump: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("{} is not a JSON dump", file.display()))?;
    let response = client.import_database(&dump).await.user_facing()?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
