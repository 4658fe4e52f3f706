//! Percentile-based trimming of daily aggregates

use super::config::TrimConfig;
use super::daily::DailyAggregate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Inclusive value range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    /// Bounds at two quantiles of `values`; `None` for an empty slice
    pub fn from_quantiles(values: &[f64], lower_q: f64, upper_q: f64) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(Self {
            lower: quantile(&sorted, lower_q)?,
            upper: quantile(&sorted, upper_q)?,
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Quantile of an ascending slice, interpolating linearly between closest ranks
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Drops aggregates outside the global quantile range of quantity or revenue.
///
/// Both ranges are computed once over the full input; a row survives only if
/// it lies inside both.
#[derive(Debug, Clone, Default)]
pub struct PercentileTrimmer {
    config: TrimConfig,
}

impl PercentileTrimmer {
    pub fn new(config: TrimConfig) -> Self {
        Self { config }
    }

    pub fn trim(&self, daily: Vec<DailyAggregate>) -> Vec<DailyAggregate> {
        if !self.config.enabled || daily.is_empty() {
            return daily;
        }

        let quantities: Vec<f64> = daily.iter().map(|r| r.quantity_sum).collect();
        let revenues: Vec<f64> = daily.iter().map(|r| r.revenue_sum).collect();
        let (Some(quantity_bounds), Some(revenue_bounds)) = (
            OutlierBounds::from_quantiles(&quantities, self.config.lower_quantile, self.config.upper_quantile),
            OutlierBounds::from_quantiles(&revenues, self.config.lower_quantile, self.config.upper_quantile),
        ) else {
            return daily;
        };

        let before = daily.len();
        let kept: Vec<DailyAggregate> = daily
            .into_iter()
            .filter(|r| quantity_bounds.contains(r.quantity_sum) && revenue_bounds.contains(r.revenue_sum))
            .collect();

        info!(
            quantity_lower = quantity_bounds.lower,
            quantity_upper = quantity_bounds.upper,
            revenue_lower = revenue_bounds.lower,
            revenue_upper = revenue_bounds.upper,
            kept = kept.len(),
            dropped = before - kept.len(),
            "Trimmed daily aggregates"
        );
        kept
    }
}
