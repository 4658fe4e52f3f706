//! Feature vector assembly for a single prediction request

use super::{EngineeredFeatures, FeatureEngineer, FeatureVector, HistoricalFeatureTable};
use crate::inference::PredictionRequest;
use crate::timeseries::{CalendarFeatures, EntityId};
use chrono::NaiveDate;
use tracing::debug;

/// Reproduces the feature vector the batch pipeline would attach to a new
/// `(date, entity)` row, reading the historical table without modifying it.
#[derive(Debug, Clone, Copy)]
pub struct OnlineFeatureAssembler<'a> {
    history: &'a HistoricalFeatureTable,
    engineer: FeatureEngineer,
}

impl<'a> OnlineFeatureAssembler<'a> {
    pub fn new(history: &'a HistoricalFeatureTable) -> Self {
        Self {
            history,
            engineer: FeatureEngineer::default(),
        }
    }

    pub fn with_engineer(mut self, engineer: FeatureEngineer) -> Self {
        self.engineer = engineer;
        self
    }

    pub fn assemble(&self, request: &PredictionRequest) -> FeatureVector {
        self.assemble_at(request.stock_code, request.date)
    }

    /// Features for `entity` on `date`.
    ///
    /// The entity's rows dated on or before `date` form the sequence; the
    /// request is appended as its newest row with an unknown quantity and the
    /// features attached to that row are returned.
    pub fn assemble_at(&self, entity: EntityId, date: NaiveDate) -> FeatureVector {
        let rows = self.history.entity_history(entity);
        let visible = &rows[..rows.partition_point(|row| row.date <= date)];

        let engineered = if visible.is_empty() {
            EngineeredFeatures::COLD_START
        } else {
            // Older rows cannot reach the newest row's window.
            let tail = &visible[visible.len().saturating_sub(self.engineer.history_depth())..];
            let mut quantities: Vec<Option<f64>> = tail.iter().map(|row| Some(row.quantity)).collect();
            quantities.push(None);

            self.engineer
                .engineer(&quantities)
                .pop()
                .unwrap_or(EngineeredFeatures::COLD_START)
        };

        debug!(
            stock_code = entity,
            date = %date,
            history_rows = visible.len(),
            lag_28 = engineered.lag_28,
            "Assembled online features"
        );

        FeatureVector {
            calendar: CalendarFeatures::from_date(date),
            entity_id: entity,
            lag_28: engineered.lag_28,
            rmean_28_7: engineered.rmean_28_7,
            rmean_28_28: engineered.rmean_28_28,
        }
    }
}
