//! Dashboard statistics: every collection walked in series, one failure
//! boundary per collection.

use std::time::Duration;

use serde::Serialize;
use timberdesk_core::{DEFAULT_PAGE_DELAY_MS, DEFAULT_PAGE_SIZE, Entity, Progress, Record};
use tokio::sync::watch;

use crate::error::LoadError;
use crate::source::{CatalogSource, EntityPages};
use crate::walk::{PageSink, clamp_page_size, walk_pages};

/// Aggregates computed once a collection is fully loaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntitySummary {
    Plain,
    Online { online: u64 },
    Products { total_volume: f64, total_value: f64, avg_price: f64 },
    Prices { avg_price_per_m3: f64 },
}

impl EntitySummary {
    /// Summary rule for `entity` applied to its fully loaded records.
    #[must_use]
    pub fn compute(entity: Entity, records: &[Record]) -> Self {
        match entity {
            Entity::Buyers | Entity::Sellers => {
                Self::Online { online: records.iter().filter(|r| r.is_online()).count() as u64 }
            },
            Entity::Products => {
                let prices: Vec<(f64, f64)> = records
                    .iter()
                    .filter_map(|r| match r {
                        Record::Product(p) => Some((p.volume, p.price)),
                        _ => None,
                    })
                    .collect();
                let total_volume = prices.iter().map(|(v, _)| v).sum();
                let total_value: f64 = prices.iter().map(|(_, p)| p).sum();
                Self::Products { total_volume, total_value, avg_price: mean(total_value, prices.len()) }
            },
            Entity::WoodTypePrices => {
                let per_m3: Vec<f64> = records
                    .iter()
                    .filter_map(|r| match r {
                        Record::WoodTypePrice(p) => Some(p.price_per_m3),
                        _ => None,
                    })
                    .collect();
                Self::Prices { avg_price_per_m3: mean(per_m3.iter().sum(), per_m3.len()) }
            },
            _ => Self::Plain,
        }
    }
}

#[allow(clippy::cast_precision_loss, reason = "record counts are far below 2^52")]
fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityStats {
    pub entity: Entity,
    /// Records loaded.
    pub total: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<Record>,
    pub summary: EntitySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EntityStats {
    fn loaded(entity: Entity, data: Vec<Record>) -> Self {
        let summary = EntitySummary::compute(entity, &data);
        Self { entity, total: data.len() as u64, data, summary, error: None }
    }

    fn failed(entity: Entity, message: String) -> Self {
        Self { entity, total: 0, data: Vec::new(), summary: EntitySummary::Plain, error: Some(message) }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsReport {
    pub entities: Vec<EntityStats>,
}

impl StatsReport {
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&EntityStats> {
        self.entities.iter().find(|s| s.entity == entity)
    }

    #[must_use]
    pub fn failed(&self) -> Vec<&EntityStats> {
        self.entities.iter().filter(|s| s.error.is_some()).collect()
    }

    /// Drop loaded records, keeping totals and summaries.
    pub fn strip_data(&mut self) {
        for stats in &mut self.entities {
            stats.data = Vec::new();
        }
    }
}

/// Progress across the whole multi-collection run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateProgress {
    pub entity_index: usize,
    pub entity_count: usize,
    pub entity: Option<Entity>,
    pub entity_progress: Progress,
    /// `(entity_index + entity fraction) / entity_count * 100`.
    pub overall: f64,
    pub generation: u64,
}

impl Default for AggregateProgress {
    fn default() -> Self {
        Self {
            entity_index: 0,
            entity_count: 0,
            entity: None,
            entity_progress: Progress::zero(),
            overall: 0.0,
            generation: 0,
        }
    }
}

#[allow(clippy::cast_precision_loss, reason = "entity counts are tiny")]
fn overall_percentage(index: usize, count: usize, entity_progress: Progress) -> f64 {
    if count == 0 {
        return 100.0;
    }
    let done = index as f64 + entity_progress.fraction();
    (done / count as f64 * 100.0).min(100.0)
}

pub struct StatsAggregator<C> {
    source: C,
    entities: Vec<Entity>,
    page_size: u64,
    pace: Duration,
    progress: watch::Sender<AggregateProgress>,
}

struct AggregateSink<'a> {
    progress: &'a watch::Sender<AggregateProgress>,
    generation: u64,
    index: usize,
    count: usize,
    entity: Entity,
    data: Vec<Record>,
}

impl AggregateSink<'_> {
    fn publish(&self, entity_progress: Progress) -> bool {
        let generation = self.generation;
        let mut current = false;
        let update = AggregateProgress {
            entity_index: self.index,
            entity_count: self.count,
            entity: Some(self.entity),
            entity_progress,
            overall: overall_percentage(self.index, self.count, entity_progress),
            generation,
        };
        self.progress.send_if_modified(|p| {
            if p.generation != generation {
                return false;
            }
            current = true;
            *p = update;
            true
        });
        current
    }
}

impl PageSink<Record> for AggregateSink<'_> {
    fn is_current(&self) -> bool {
        self.progress.borrow().generation == self.generation
    }

    fn accept(&mut self, items: Vec<Record>, progress: Progress) -> bool {
        if !self.publish(progress) {
            return false;
        }
        self.data.extend(items);
        true
    }
}

impl<C: CatalogSource> StatsAggregator<C> {
    /// Aggregator over every collection in [`Entity::ALL`] order.
    #[must_use]
    pub fn new(source: C) -> Self {
        Self {
            source,
            entities: Entity::ALL.to_vec(),
            page_size: DEFAULT_PAGE_SIZE,
            pace: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
            progress: watch::Sender::new(AggregateProgress::default()),
        }
    }

    #[must_use]
    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = entities;
        self
    }

    /// # Errors
    /// `InvalidPageSize` for zero; larger sizes are clamped.
    pub fn with_page_size(mut self, page_size: u64) -> Result<Self, LoadError> {
        self.page_size = clamp_page_size(page_size)?;
        Ok(self)
    }

    #[must_use]
    pub const fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    #[must_use]
    pub const fn source(&self) -> &C {
        &self.source
    }

    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AggregateProgress> {
        self.progress.subscribe()
    }

    /// Walk each collection in turn. A failed collection is reported with its
    /// error and the run moves on to the next one.
    ///
    /// # Errors
    /// Only `Superseded`, when another `run` started meanwhile.
    pub async fn run(&self) -> Result<StatsReport, LoadError> {
        let count = self.entities.len();
        let mut generation = 0;
        self.progress.send_modify(|p| {
            generation = p.generation + 1;
            *p = AggregateProgress { entity_count: count, generation, ..AggregateProgress::default() };
        });
        tracing::info!(generation, entities = count, "stats run started");

        let mut report = StatsReport { entities: Vec::with_capacity(count) };
        for (index, &entity) in self.entities.iter().enumerate() {
            let mut sink =
                AggregateSink { progress: &self.progress, generation, index, count, entity, data: Vec::new() };
            if !sink.publish(Progress::zero()) {
                return Err(LoadError::Superseded);
            }

            let pages = EntityPages::new(&self.source, entity);
            let stats = match walk_pages(&pages, self.page_size, self.pace, &mut sink).await {
                Ok(_) => EntityStats::loaded(entity, std::mem::take(&mut sink.data)),
                Err(LoadError::Superseded) => return Err(LoadError::Superseded),
                Err(err) => {
                    tracing::warn!(%entity, error = %err, "entity walk failed, continuing");
                    EntityStats::failed(entity, err.user_message())
                },
            };
            tracing::debug!(%entity, total = stats.total, "entity loaded");
            report.entities.push(stats);
        }

        let finished = AggregateProgress {
            entity_index: count,
            entity_count: count,
            entity: None,
            entity_progress: Progress::complete(0),
            overall: 100.0,
            generation,
        };
        let current = self.progress.send_if_modified(|p| {
            if p.generation != generation {
                return false;
            }
            *p = finished;
            true
        });
        if !current {
            return Err(LoadError::Superseded);
        }
        tracing::info!(generation, failed = report.failed().len(), "stats run finished");
        Ok(report)
    }
}
