//! Persistence of the historical feature table and raw transaction loading
//!
//! Tables travel as CSV through polars. Loading the feature table is the
//! only I/O the serving path performs, and it happens before any feature
//! computation.

mod transactions;

pub use transactions::load_transactions;

use crate::error::{ForecastError, Result};
use crate::features::{FeatureRow, HistoricalFeatureTable};
use crate::timeseries::{CalendarFeaturizer, CalendarFeatures};
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// Column layout of the persisted historical table
pub const HISTORY_COLUMNS: [&str; 14] = [
    "Date",
    "Year",
    "Quarter",
    "Month",
    "Week",
    "Weekday",
    "DayOfYear",
    "Day",
    "StockCode",
    "Quantity",
    "Revenue",
    "lag_28",
    "rmean_28_7",
    "rmean_28_28",
];

/// Read/write access to the persisted historical table
pub trait HistoryStore: Send + Sync {
    /// Read the whole table; failures surface as `DataUnavailable`
    fn load(&self) -> Result<HistoricalFeatureTable>;

    /// Replace the stored table
    fn save(&self, table: &HistoricalFeatureTable) -> Result<()>;
}

/// Historical table stored as a single CSV file
#[derive(Debug, Clone)]
pub struct CsvHistoryStore {
    path: PathBuf,
}

impl CsvHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for CsvHistoryStore {
    fn load(&self) -> Result<HistoricalFeatureTable> {
        let unavailable =
            |e: ForecastError| ForecastError::DataUnavailable(format!("{}: {}", self.path.display(), e));

        let df = read_text_csv(&self.path, false).map_err(unavailable)?;
        let rows = dataframe_to_rows(&df).map_err(unavailable)?;
        let table = HistoricalFeatureTable::new(rows);

        info!(
            path = %self.path.display(),
            rows = table.len(),
            entities = table.n_entities(),
            "Loaded historical feature table"
        );
        Ok(table)
    }

    fn save(&self, table: &HistoricalFeatureTable) -> Result<()> {
        let mut df = table_to_dataframe(table)?;
        write_csv(&mut df, &self.path)?;
        info!(path = %self.path.display(), rows = table.len(), "Saved historical feature table");
        Ok(())
    }
}

/// Read a CSV with every column as text
pub(crate) fn read_text_csv(path: &Path, lossy: bool) -> Result<DataFrame> {
    if !path.exists() {
        return Err(ForecastError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    let encoding = if lossy { CsvEncoding::LossyUtf8 } else { CsvEncoding::Utf8 };
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_encoding(encoding))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Write a frame as CSV with a header, creating parent directories
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Text cells of a named column
pub(crate) fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| ForecastError::DataError(format!("missing column {}", name)))?
        .cast(&DataType::String)?;
    let values = column
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

fn required_cells<T: std::str::FromStr>(df: &DataFrame, name: &str) -> Result<Vec<T>> {
    text_column(df, name)?
        .into_iter()
        .enumerate()
        .map(|(i, cell)| {
            cell.as_deref()
                .map(str::trim)
                .and_then(|raw| raw.parse::<T>().ok())
                .ok_or_else(|| {
                    ForecastError::DataError(format!("row {}: bad or missing {} value {:?}", i, name, cell))
                })
        })
        .collect()
}

fn dataframe_to_rows(df: &DataFrame) -> Result<Vec<FeatureRow>> {
    let dates: Vec<NaiveDate> = required_cells::<String>(df, "Date")?
        .iter()
        .map(|raw| {
            CalendarFeaturizer::parse_date(raw)
                .map_err(|_| ForecastError::DataError(format!("bad Date value {:?}", raw)))
        })
        .collect::<Result<_>>()?;
    let entity: Vec<i64> = required_cells(df, "StockCode")?;
    let quantity: Vec<f64> = required_cells(df, "Quantity")?;
    let revenue: Vec<f64> = required_cells(df, "Revenue")?;
    let lag: Vec<f64> = required_cells(df, "lag_28")?;
    let short: Vec<f64> = required_cells(df, "rmean_28_7")?;
    let long: Vec<f64> = required_cells(df, "rmean_28_28")?;

    // Calendar columns are derived from Date; reading them only checks presence.
    for name in &HISTORY_COLUMNS[1..8] {
        df.column(name)
            .map_err(|_| ForecastError::DataError(format!("missing column {}", name)))?;
    }

    let rows = (0..df.height())
        .map(|i| FeatureRow {
            date: dates[i],
            calendar: CalendarFeatures::from_date(dates[i]),
            entity_id: entity[i],
            quantity: quantity[i],
            revenue: revenue[i],
            lag_28: lag[i],
            rmean_28_7: short[i],
            rmean_28_28: long[i],
        })
        .collect();
    Ok(rows)
}

fn table_to_dataframe(table: &HistoricalFeatureTable) -> Result<DataFrame> {
    let rows = table.rows();
    let int_col = |name: &str, f: fn(&FeatureRow) -> i64| -> Column {
        Column::new(name.into(), rows.iter().map(f).collect::<Vec<i64>>())
    };
    let float_col = |name: &str, f: fn(&FeatureRow) -> f64| -> Column {
        Column::new(name.into(), rows.iter().map(f).collect::<Vec<f64>>())
    };

    let dates: Vec<String> = rows.iter().map(|r| r.date.format("%Y-%m-%d").to_string()).collect();
    let df = DataFrame::new(vec![
        Column::new("Date".into(), dates),
        int_col("Year", |r| r.calendar.year as i64),
        int_col("Quarter", |r| r.calendar.quarter as i64),
        int_col("Month", |r| r.calendar.month as i64),
        int_col("Week", |r| r.calendar.week as i64),
        int_col("Weekday", |r| r.calendar.weekday as i64),
        int_col("DayOfYear", |r| r.calendar.day_of_year as i64),
        int_col("Day", |r| r.calendar.day as i64),
        int_col("StockCode", |r| r.entity_id),
        float_col("Quantity", |r| r.quantity),
        float_col("Revenue", |r| r.revenue),
        float_col("lag_28", |r| r.lag_28),
        float_col("rmean_28_7", |r| r.rmean_28_7),
        float_col("rmean_28_28", |r| r.rmean_28_28),
    ])?;
    Ok(df)
}
