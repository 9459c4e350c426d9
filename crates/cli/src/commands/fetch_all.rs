use std::sync::Arc;

use anyhow::Result;
use timberdesk_client::ApiClient;
use timberdesk_core::{Entity, Record};
use timberdesk_loader::{EntityPages, LoadState, ProgressiveLoader};

use super::{UserFacing, page_size_within};
use super::progress::{follow, new_bar};

/// Walk every page of `entity` behind a progress bar.
pub(crate) async fn load_all(client: Arc<ApiClient>, entity: Entity, size: u64) -> Result<Vec<Record>> {
    let pace = client.page_delay();
    let size = page_size_within(size, client.max_page_size());
    let loader = ProgressiveLoader::new(EntityPages::new(client, entity), size).user_facing()?.with_pace(pace);
    let bar = new_bar(&entity.to_string(), "pages");

    let watcher = follow(loader.subscribe(), &bar, |state: &LoadState<Record>, bar| {
        bar.set_length(state.progress.total);
        bar.set_position(state.progress.current);
        bar.set_message(format!("{} records", state.data.len()));
        state.generation > 0 && !state.loading
    });
    let (result, ()) = tokio::join!(loader.refetch(), watcher);

    match result {
        Ok(records) => {
            bar.finish_with_message(format!("{} records", records.len()));
            Ok(records)
        },
        Err(e) => {
            bar.abandon_with_message("failed");
            Err(e).user_facing()
        },
    }
}

pub(crate) async fn run(client: Arc<ApiClient>, entity: Entity, size: u64) -> Result<()> {
    let records = load_all(client, entity, size).await?;
    tracing::info!("Loaded {} {} records", records.len(), entity);
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
