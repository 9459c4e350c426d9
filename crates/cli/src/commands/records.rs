use anyhow::Result;
use serde_json::json;
use timberdesk_client::ApiClient;
use timberdesk_core::Entity;
use timberdesk_loader::PagedView;

use super::{UserFacing, page_size_within, parse_object};

pub(crate) async fn run_list(client: &ApiClient, entity: Entity, page: u64, size: u64) -> Result<()> {
    let size = page_size_within(size, client.max_page_size());
    let mut view = PagedView::new(client, entity, size).user_facing()?;
    view.set_page(page).await.user_facing()?;
    let out = json!({
        "data": view.items(),
        "pagination": {
            "page": view.page(),
            "page_size": view.page_size(),
            "total": view.total(),
            "total_pages": view.total_pages(),
        },
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

pub(crate) async fn run_get(client: &ApiClient, entity: Entity, id: &str) -> Result<()> {
    let record = client.get(entity, id).await.user_facing()?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

pub(crate) async fn run_create(client: &ApiClient, entity: Entity, data: &str) -> Result<()> {
    let body = parse_object(data)?;
    let record = client.create(entity, body).await.user_facing()?;
    tracing::info!("Created {} {}", entity, record.id());
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

pub(crate) async fn run_update(client: &ApiClient, entity: Entity, id: &str, data: &str) -> Result<()> {
    let patch = parse_object(data)?;
    let record = client.update(entity, id, patch).await.user_facing()?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

pub(crate) async fn run_delete(client: &ApiClient, entity: Entity, id: &str) -> Result<()> {
    client.delete(entity, id).await.user_facing()?;
    println!("Deleted {entity} {id}");
    Ok(())
}
