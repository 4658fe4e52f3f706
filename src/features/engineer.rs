//! Lag and rolling-mean feature computation shared by batch and online paths

use super::{FeatureRow, HistoricalFeatureTable, LAG_PERIODS, LONG_WINDOW, SENTINEL, SHORT_WINDOW};
use crate::aggregation::DailyAggregate;
use crate::timeseries::{GroupedLagWindow, GroupedRollingStat, TimeSeriesTable};
use tracing::debug;

/// Engineered values for one row, sentinel-filled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineeredFeatures {
    pub lag_28: f64,
    pub rmean_28_7: f64,
    pub rmean_28_28: f64,
}

impl EngineeredFeatures {
    /// Values for an entity without usable history
    pub const COLD_START: Self = Self {
        lag_28: SENTINEL,
        rmean_28_7: SENTINEL,
        rmean_28_28: SENTINEL,
    };
}

/// Computes `lag_28`, `rmean_28_7` and `rmean_28_28` over an entity's
/// date-sorted quantity sequence
#[derive(Debug, Clone, Copy)]
pub struct FeatureEngineer {
    lag: GroupedLagWindow,
    short_mean: GroupedRollingStat,
    long_mean: GroupedRollingStat,
}

impl Default for FeatureEngineer {
    fn default() -> Self {
        Self {
            lag: GroupedLagWindow::new(LAG_PERIODS),
            short_mean: GroupedRollingStat::mean(SHORT_WINDOW),
            long_mean: GroupedRollingStat::mean(LONG_WINDOW),
        }
    }
}

impl FeatureEngineer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trailing rows that can influence the features of the newest row
    pub fn history_depth(&self) -> usize {
        self.lag.periods() + self.short_mean.window().max(self.long_mean.window()) - 1
    }

    /// Features for every position of one entity's sequence.
    ///
    /// `None` quantities mark rows whose value is not known yet (the row of an
    /// incoming request); they anchor a position without feeding a value.
    pub fn engineer(&self, quantities: &[Option<f64>]) -> Vec<EngineeredFeatures> {
        let lag = self.lag.apply(quantities);
        let short = self.short_mean.apply(&lag);
        let long = self.long_mean.apply(&lag);

        lag.iter()
            .zip(short)
            .zip(long)
            .map(|((lag, short), long)| EngineeredFeatures {
                lag_28: lag.unwrap_or(SENTINEL),
                rmean_28_7: short.unwrap_or(SENTINEL),
                rmean_28_28: long.unwrap_or(SENTINEL),
            })
            .collect()
    }

    /// Build the historical feature table from date-sorted daily aggregates
    pub fn engineer_table(&self, daily: &TimeSeriesTable<DailyAggregate>) -> HistoricalFeatureTable {
        let featured = daily.transform(|_, series| {
            let quantities: Vec<Option<f64>> =
                series.iter().map(|obs| Some(obs.value.quantity_sum)).collect();
            self.engineer(&quantities)
                .into_iter()
                .zip(series)
                .map(|(features, obs)| FeatureRow::from_aggregate(&obs.value, features))
                .collect::<Vec<_>>()
        });

        let rows: Vec<FeatureRow> = featured.into_rows().map(|(_, obs)| obs.value).collect();
        debug!(rows = rows.len(), entities = daily.n_groups(), "Engineered lag and rolling features");
        HistoricalFeatureTable::new(rows)
    }
}
