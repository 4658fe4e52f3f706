//! Historical aggregation
//!
//! Turns raw sales lines into the historical feature table:
//! - Cleaning of cancellations, bogus codes and implausible prices/quantities
//! - Entity-day aggregation of quantity and revenue
//! - Global percentile trimming
//! - Lag and rolling-mean features per entity

mod cleaning;
mod config;
mod daily;
mod outlier;
mod pipeline;

pub use cleaning::{CleanedTransaction, TransactionCleaner, TransactionRecord};
pub use config::{AggregatorConfig, CleaningRules, TrimConfig};
pub use daily::{aggregate_daily, group_by_entity, DailyAggregate};
pub use outlier::{quantile, OutlierBounds, PercentileTrimmer};
pub use pipeline::HistoricalAggregator;
