//! Feature rows, the historical feature table and model feature vectors
//!
//! Both the offline table build and the per-request assembly go through the
//! same [`FeatureEngineer`], so lag and rolling values cannot drift apart
//! between the two paths.

mod engineer;
mod online;

pub use engineer::{EngineeredFeatures, FeatureEngineer};
pub use online::OnlineFeatureAssembler;

use crate::aggregation::DailyAggregate;
use crate::timeseries::{CalendarFeatures, EntityId};
use chrono::NaiveDate;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;

/// Fill value for "not enough history"
pub const SENTINEL: f64 = -1.0;

/// Rows to look back for the lag feature
pub const LAG_PERIODS: usize = 28;

/// Trailing windows applied to the lag column
pub const SHORT_WINDOW: usize = 7;
pub const LONG_WINDOW: usize = 28;

/// Columns the model is trained on, in order
pub const FEATURE_COLUMNS: [&str; 11] = [
    "Year",
    "Quarter",
    "Month",
    "Week",
    "Weekday",
    "DayOfYear",
    "Day",
    "StockCode",
    "lag_28",
    "rmean_28_7",
    "rmean_28_28",
];

/// Target column
pub const TARGET_COLUMN: &str = "Quantity";

/// One entity-day of the historical feature table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub calendar: CalendarFeatures,
    pub entity_id: EntityId,
    pub quantity: f64,
    pub revenue: f64,
    pub lag_28: f64,
    pub rmean_28_7: f64,
    pub rmean_28_28: f64,
}

impl FeatureRow {
    pub fn from_aggregate(aggregate: &DailyAggregate, features: EngineeredFeatures) -> Self {
        Self {
            date: aggregate.date,
            calendar: aggregate.calendar,
            entity_id: aggregate.entity_id,
            quantity: aggregate.quantity_sum,
            revenue: aggregate.revenue_sum,
            lag_28: features.lag_28,
            rmean_28_7: features.rmean_28_7,
            rmean_28_28: features.rmean_28_28,
        }
    }

    /// Model inputs carried by this row
    pub fn feature_vector(&self) -> FeatureVector {
        FeatureVector {
            calendar: self.calendar,
            entity_id: self.entity_id,
            lag_28: self.lag_28,
            rmean_28_7: self.rmean_28_7,
            rmean_28_28: self.rmean_28_28,
        }
    }
}

/// Entity-day feature rows, grouped by entity and date-sorted within each group.
///
/// Read-only once built; a refresh replaces the whole table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalFeatureTable {
    rows: Vec<FeatureRow>,
    index: HashMap<EntityId, Range<usize>>,
}

impl HistoricalFeatureTable {
    /// Build a table, ordering rows by `(entity, date)`
    pub fn new(mut rows: Vec<FeatureRow>) -> Self {
        rows.sort_by_key(|row| (row.entity_id, row.date));

        let mut index: HashMap<EntityId, Range<usize>> = HashMap::new();
        let mut start = 0;
        while start < rows.len() {
            let entity = rows[start].entity_id;
            let end = start + rows[start..].partition_point(|row| row.entity_id == entity);
            index.insert(entity, start..end);
            start = end;
        }

        Self { rows, index }
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn n_entities(&self) -> usize {
        self.index.len()
    }

    /// Date-sorted rows of a single entity (empty when unknown)
    pub fn entity_history(&self, entity: EntityId) -> &[FeatureRow] {
        self.index
            .get(&entity)
            .map(|range| &self.rows[range.clone()])
            .unwrap_or(&[])
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|row| row.date).max()
    }
}

/// Ordered model input for one entity-day, see [`FEATURE_COLUMNS`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub calendar: CalendarFeatures,
    pub entity_id: EntityId,
    pub lag_28: f64,
    pub rmean_28_7: f64,
    pub rmean_28_28: f64,
}

impl FeatureVector {
    pub fn values(&self) -> [f64; FEATURE_COLUMNS.len()] {
        let c = &self.calendar;
        [
            c.year as f64,
            c.quarter as f64,
            c.month as f64,
            c.week as f64,
            c.weekday as f64,
            c.day_of_year as f64,
            c.day as f64,
            self.entity_id as f64,
            self.lag_28,
            self.rmean_28_7,
            self.rmean_28_28,
        ]
    }

    pub fn to_array(&self) -> Array1<f64> {
        Array1::from(self.values().to_vec())
    }

    /// Value of a named model column
    pub fn get(&self, column: &str) -> Option<f64> {
        FEATURE_COLUMNS
            .iter()
            .position(|name| *name == column)
            .map(|i| self.values()[i])
    }

    /// `column -> value` object
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = FEATURE_COLUMNS
            .iter()
            .zip(self.values())
            .map(|(name, value)| (name.to_string(), serde_json::json!(value)))
            .collect();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(entity: EntityId, day: u32, quantity: f64) -> FeatureRow {
        let date = NaiveDate::from_ymd_opt(2011, 5, day).unwrap();
        FeatureRow {
            date,
            calendar: CalendarFeatures::from_date(date),
            entity_id: entity,
            quantity,
            revenue: quantity * 2.0,
            lag_28: SENTINEL,
            rmean_28_7: SENTINEL,
            rmean_28_28: SENTINEL,
        }
    }

    #[test]
    fn test_table_groups_and_sorts() {
        let table = HistoricalFeatureTable::new(vec![
            row(2, 3, 1.0),
            row(1, 2, 2.0),
            row(2, 1, 3.0),
            row(1, 1, 4.0),
        ]);

        assert_eq!(table.len(), 4);
        assert_eq!(table.n_entities(), 2);
        let history = table.entity_history(2);
        assert_eq!(history.len(), 2);
        assert!(history[0].date < history[1].date);
        assert_eq!(history[0].quantity, 3.0);
        assert!(table.entity_history(99).is_empty());
        assert_eq!(table.max_date(), NaiveDate::from_ymd_opt(2011, 5, 3));
    }

    #[test]
    fn test_feature_vector_column_order() {
        let mut r = row(85123, 20, 6.0);
        r.lag_28 = 11.0;
        r.rmean_28_7 = 9.5;
        let vector = r.feature_vector();

        let values = vector.values();
        assert_eq!(values[0], 2011.0);
        assert_eq!(values[7], 85123.0);
        assert_eq!(values[8], 11.0);
        assert_eq!(vector.get("rmean_28_7"), Some(9.5));
        assert_eq!(vector.get("rmean_28_28"), Some(SENTINEL));
        assert_eq!(vector.get("Quantity"), None);
        assert_eq!(vector.to_array().len(), FEATURE_COLUMNS.len());
        assert_eq!(vector.to_json()["StockCode"], serde_json::json!(85123.0));
    }
}
