use std::sync::Arc;

use anyhow::Result;
use timberdesk_client::ApiClient;
use timberdesk_core::Entity;
use timberdesk_loader::{AggregateProgress, StatsAggregator};

use super::UserFacing;
use super::progress::{follow, new_bar};

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "overall is clamped to 0..=100"
)]
fn percent(overall: f64) -> u64 {
    overall.clamp(0.0, 100.0).round() as u64
}

pub(crate) async fn run(client: Arc<ApiClient>, entities: Vec<Entity>, with_data: bool) -> Result<()> {
    let pace = client.page_delay();
    let page_size = client.max_page_size();
    let mut aggregator = StatsAggregator::new(client).with_page_size(page_size).user_facing()?.with_pace(pace);
    if !entities.is_empty() {
        aggregator = aggregator.with_entities(entities);
    }

    let bar = new_bar("stats", "%");
    bar.set_length(100);
    let watcher = follow(aggregator.subscribe(), &bar, |p: &AggregateProgress, bar| {
        bar.set_position(percent(p.overall));
        if let Some(entity) = p.entity {
            bar.set_message(entity.to_string());
        }
        p.generation > 0 && p.entity.is_none() && p.overall >= 100.0
    });
    let (result, ()) = tokio::join!(aggregator.run(), watcher);
    let mut report = result.user_facing()?;
    bar.finish_and_clear();

    for failed in report.failed() {
        tracing::warn!("{}: {}", failed.entity, failed.error.as_deref().unwrap_or_default());
    }
    if !with_data {
        report.strip_data();
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
