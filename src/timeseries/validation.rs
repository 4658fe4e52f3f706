//! Date-based train/validation split of the historical feature table

use crate::error::{ForecastError, Result};
use crate::features::{FeatureRow, HistoricalFeatureTable, FEATURE_COLUMNS, TARGET_COLUMN};
use chrono::{NaiveDate, TimeDelta};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use tracing::info;

/// Days held out at the end of the table for validation
pub const DEFAULT_HORIZON_DAYS: i64 = 28;

/// Model feature matrix with its Quantity target
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSplit {
    /// Rows x [`FEATURE_COLUMNS`]
    pub features: Array2<f64>,
    pub target: Array1<f64>,
}

impl DatasetSplit {
    fn from_rows(rows: &[&FeatureRow]) -> Result<Self> {
        let n_cols = FEATURE_COLUMNS.len();
        let flat: Vec<f64> = rows
            .iter()
            .flat_map(|row| row.feature_vector().values())
            .collect();
        let features = Array2::from_shape_vec((rows.len(), n_cols), flat)?;
        let target = rows.iter().map(|row| row.quantity).collect();
        Ok(Self { features, target })
    }

    pub fn n_rows(&self) -> usize {
        self.target.len()
    }

    /// Feature columns followed by the target column
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = FEATURE_COLUMNS
            .iter()
            .enumerate()
            .map(|(j, name)| Column::new((*name).into(), self.features.column(j).to_vec()))
            .collect();
        columns.push(Column::new(TARGET_COLUMN.into(), self.target.to_vec()));
        Ok(DataFrame::new(columns)?)
    }
}

/// Training rows before the cutoff, validation rows from the cutoff on
#[derive(Debug, Clone, PartialEq)]
pub struct TrainValSplit {
    pub cutoff: NaiveDate,
    pub train: DatasetSplit,
    pub validation: DatasetSplit,
}

impl TrainValSplit {
    /// Split with `cutoff = max(date) - horizon_days`
    pub fn from_table(table: &HistoricalFeatureTable, horizon_days: i64) -> Result<Self> {
        let max_date = table.max_date().ok_or_else(|| {
            ForecastError::DataUnavailable("historical feature table is empty".to_string())
        })?;
        let cutoff = TimeDelta::try_days(horizon_days)
            .and_then(|horizon| max_date.checked_sub_signed(horizon))
            .ok_or_else(|| {
                ForecastError::ConfigError(format!(
                    "horizon of {} days reaches outside the calendar from {}",
                    horizon_days, max_date
                ))
            })?;

        let (train, validation): (Vec<&FeatureRow>, Vec<&FeatureRow>) =
            table.rows().iter().partition(|row| row.date < cutoff);

        info!(
            cutoff = %cutoff,
            train_rows = train.len(),
            validation_rows = validation.len(),
            "Split historical table"
        );

        Ok(Self {
            cutoff,
            train: DatasetSplit::from_rows(&train)?,
            validation: DatasetSplit::from_rows(&validation)?,
        })
    }

    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_COLUMNS
    }
}
