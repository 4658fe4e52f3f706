//! Historical aggregation configuration

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Predicates a raw transaction must pass to be kept
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CleaningRules {
    /// Invoice numbers starting with this character are cancellations
    pub cancellation_prefix: char,

    /// Known bogus quantity dropped outright
    pub sentinel_quantity: i64,

    /// Stock codes must contain exactly this many digits
    pub stock_code_digits: usize,

    /// Descriptions need strictly more upper-case characters than this
    pub min_description_uppercase: usize,

    /// Exclusive unit price bounds
    pub min_unit_price: f64,
    pub max_unit_price: f64,

    /// Quantities must be strictly below this
    pub max_quantity: i64,
}

impl Default for CleaningRules {
    fn default() -> Self {
        Self {
            cancellation_prefix: 'C',
            sentinel_quantity: 80995,
            stock_code_digits: 5,
            min_description_uppercase: 5,
            min_unit_price: 0.1,
            max_unit_price: 20.0,
            max_quantity: 55,
        }
    }
}

/// Global percentile trimming of daily aggregates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrimConfig {
    pub enabled: bool,

    /// Lower quantile, inclusive bound
    pub lower_quantile: f64,

    /// Upper quantile, inclusive bound
    pub upper_quantile: f64,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lower_quantile: 0.01,
            upper_quantile: 0.99,
        }
    }
}

/// Configuration for the historical aggregator
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AggregatorConfig {
    pub cleaning: CleaningRules,
    pub trim: TrimConfig,
}

impl AggregatorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON configuration file; missing keys fall back to defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Builder method to replace the cleaning rules
    pub fn with_cleaning(mut self, cleaning: CleaningRules) -> Self {
        self.cleaning = cleaning;
        self
    }

    /// Builder method to set trimming quantiles
    pub fn with_trim(mut self, lower_quantile: f64, upper_quantile: f64) -> Self {
        self.trim = TrimConfig {
            enabled: true,
            lower_quantile,
            upper_quantile,
        };
        self
    }

    /// Builder method to disable outlier trimming
    pub fn without_trim(mut self) -> Self {
        self.trim.enabled = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let TrimConfig {
            lower_quantile: low,
            upper_quantile: high,
            ..
        } = self.trim;
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low >= high {
            return Err(ForecastError::ConfigError(format!(
                "trim quantiles must satisfy 0 <= lower < upper <= 1, got {} and {}",
                low, high
            )));
        }
        if self.cleaning.min_unit_price >= self.cleaning.max_unit_price {
            return Err(ForecastError::ConfigError(format!(
                "unit price bounds are empty: ({}, {})",
                self.cleaning.min_unit_price, self.cleaning.max_unit_price
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AggregatorConfig::default();
        assert_eq!(config.cleaning.sentinel_quantity, 80995);
        assert_eq!(config.cleaning.max_quantity, 55);
        assert!(config.trim.enabled);
        assert_eq!(config.trim.upper_quantile, 0.99);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = AggregatorConfig::new().with_trim(0.05, 0.95);
        assert_eq!(config.trim.lower_quantile, 0.05);

        let config = config.without_trim();
        assert!(!config.trim.enabled);
    }

    #[test]
    fn test_rejects_inverted_quantiles() {
        let config = AggregatorConfig::new().with_trim(0.9, 0.1);
        assert!(matches!(config.validate(), Err(ForecastError::ConfigError(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AggregatorConfig =
            serde_json::from_str(r#"{"cleaning": {"max_quantity": 100}}"#).unwrap();
        assert_eq!(config.cleaning.max_quantity, 100);
        assert_eq!(config.cleaning.stock_code_digits, 5);
        assert_eq!(config.trim, TrimConfig::default());
    }
}
