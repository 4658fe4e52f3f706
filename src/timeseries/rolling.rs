//! Grouped trailing-window means

use super::table::TimeSeriesTable;

/// Trailing-window mean anchored at the current row.
///
/// The window at position `i` covers rows `i - window + 1 ..= i`. When fewer
/// than `window` rows exist, or any value inside the window is missing, the
/// result is `None`; it is never computed over a shortened window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupedRollingStat {
    window: usize,
}

impl GroupedRollingStat {
    pub fn mean(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Roll over a single date-sorted series
    pub fn apply(&self, series: &[Option<f64>]) -> Vec<Option<f64>> {
        (0..series.len())
            .map(|i| {
                if i + 1 < self.window {
                    return None;
                }
                let values: Option<Vec<f64>> = series[i + 1 - self.window..=i].iter().copied().collect();
                values.map(|v| v.iter().sum::<f64>() / v.len() as f64)
            })
            .collect()
    }

    /// Roll over every group of a date-sorted table independently
    pub fn apply_grouped(&self, table: &TimeSeriesTable<Option<f64>>) -> TimeSeriesTable<Option<f64>> {
        table.transform(|_, series| {
            let values: Vec<Option<f64>> = series.iter().map(|obs| obs.value).collect();
            self.apply(&values)
        })
    }
}
