//! Time series module
//!
//! Provides the per-entity series primitives shared by the batch and online
//! feature paths:
//! - Grouped, date-ordered series container
//! - Calendar features
//! - Lag features counted in rows
//! - Trailing rolling means
//! - Train/validation split by date

mod calendar;
mod lag;
mod rolling;
mod table;
mod validation;

pub use calendar::{CalendarFeaturizer, CalendarFeatures};
pub use lag::GroupedLagWindow;
pub use rolling::GroupedRollingStat;
pub use table::{EntityId, Observation, TimeSeriesTable};
pub use validation::{DatasetSplit, TrainValSplit, DEFAULT_HORIZON_DAYS};
