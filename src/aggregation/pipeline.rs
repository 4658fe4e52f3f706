//! Raw transactions to historical feature table

use super::cleaning::{CleanedTransaction, TransactionCleaner, TransactionRecord};
use super::config::AggregatorConfig;
use super::daily::{aggregate_daily, group_by_entity, DailyAggregate};
use super::outlier::PercentileTrimmer;
use crate::error::Result;
use crate::features::{FeatureEngineer, HistoricalFeatureTable};
use std::time::Instant;
use tracing::info;

/// Builds the historical feature table.
///
/// Stages run strictly in order: clean, aggregate to entity-day, trim global
/// percentile outliers, then compute lag and rolling features per entity.
/// The build is a pure transform; persisting the result is a separate step
/// (see [`crate::storage::HistoryStore`]).
#[derive(Debug, Clone, Default)]
pub struct HistoricalAggregator {
    config: AggregatorConfig,
    engineer: FeatureEngineer,
}

impl HistoricalAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            config,
            engineer: FeatureEngineer::default(),
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn clean(&self, records: &[TransactionRecord]) -> Vec<CleanedTransaction> {
        TransactionCleaner::new(self.config.cleaning.clone()).clean(records)
    }

    pub fn aggregate(&self, cleaned: &[CleanedTransaction]) -> Vec<DailyAggregate> {
        let daily = aggregate_daily(cleaned);
        info!(transactions = cleaned.len(), entity_days = daily.len(), "Aggregated to entity-day");
        daily
    }

    pub fn trim(&self, daily: Vec<DailyAggregate>) -> Vec<DailyAggregate> {
        PercentileTrimmer::new(self.config.trim.clone()).trim(daily)
    }

    /// Lag and rolling features over (already trimmed) daily aggregates
    pub fn featurize(&self, daily: Vec<DailyAggregate>) -> HistoricalFeatureTable {
        self.engineer.engineer_table(&group_by_entity(daily))
    }

    /// Run the full pipeline
    pub fn build(&self, records: &[TransactionRecord]) -> Result<HistoricalFeatureTable> {
        self.config.validate()?;
        let start = Instant::now();

        let cleaned = self.clean(records);
        let daily = self.aggregate(&cleaned);
        let trimmed = self.trim(daily);
        let table = self.featurize(trimmed);

        info!(
            rows = table.len(),
            entities = table.n_entities(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Historical feature table built"
        );
        Ok(table)
    }
}
