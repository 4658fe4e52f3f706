//! Model collaborator interface and the shipped forecasters

use crate::error::{ForecastError, Result};
use crate::features::{FeatureVector, FEATURE_COLUMNS, SENTINEL};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// An opaque trained model: feature vector in, quantity out
pub trait Forecaster: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Identifier reported as `model_version`
    fn version(&self) -> &str;
}

/// Linear model exported as JSON: `intercept + sum(weight * column)`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearForecaster {
    pub version: String,
    #[serde(default)]
    pub intercept: f64,
    pub weights: BTreeMap<String, f64>,
}

impl LinearForecaster {
    pub fn new(version: impl Into<String>, intercept: f64, weights: BTreeMap<String, f64>) -> Self {
        Self {
            version: version.into(),
            intercept,
            weights,
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::ConfigError(format!("cannot read model {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl Forecaster for LinearForecaster {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let mut total = self.intercept;
        for (column, weight) in &self.weights {
            let value = features.get(column).ok_or_else(|| {
                ForecastError::PredictionFailed(format!(
                    "model expects column {:?}, available: {}",
                    column,
                    FEATURE_COLUMNS.join(", ")
                ))
            })?;
            total += weight * value;
        }
        Ok(total)
    }

    fn version(&self) -> &str {
        &self.version
    }
}

/// Fallback when no trained model is configured: the recent weekly mean of the
/// lagged series, else the lag itself, else zero
#[derive(Debug, Clone, Default)]
pub struct SeasonalNaiveForecaster;

impl Forecaster for SeasonalNaiveForecaster {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let value = [features.rmean_28_7, features.lag_28]
            .into_iter()
            .find(|v| *v != SENTINEL)
            .unwrap_or(0.0);
        Ok(value)
    }

    fn version(&self) -> &str {
        "seasonal-naive"
    }
}
