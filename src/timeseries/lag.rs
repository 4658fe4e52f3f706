//! Grouped lag features

use super::table::TimeSeriesTable;

/// Value observed `periods` rows earlier in an entity's own sorted sequence.
///
/// The shift counts rows, not calendar days: an entity with gaps in its sales
/// history looks back over its recorded days only. Positions with fewer than
/// `periods` prior rows yield `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupedLagWindow {
    periods: usize,
}

impl GroupedLagWindow {
    pub fn new(periods: usize) -> Self {
        Self { periods }
    }

    pub fn periods(&self) -> usize {
        self.periods
    }

    /// Shift a single date-sorted series
    pub fn apply(&self, series: &[Option<f64>]) -> Vec<Option<f64>> {
        (0..series.len())
            .map(|i| {
                if i >= self.periods {
                    series[i - self.periods]
                } else {
                    None
                }
            })
            .collect()
    }

    /// Shift every group of a date-sorted table independently
    pub fn apply_grouped(&self, table: &TimeSeriesTable<Option<f64>>) -> TimeSeriesTable<Option<f64>> {
        table.transform(|_, series| {
            let values: Vec<Option<f64>> = series.iter().map(|obs| obs.value).collect();
            self.apply(&values)
        })
    }
}
