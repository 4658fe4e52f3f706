//! Date-part features

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Accepted timestamp layouts, tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Calendar fields derived from a date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFeatures {
    pub year: i32,
    /// 1-4
    pub quarter: u32,
    /// 1-12
    pub month: u32,
    /// ISO-8601 week number
    pub week: u32,
    /// Monday = 0 .. Sunday = 6
    pub weekday: u32,
    /// 1-366
    pub day_of_year: u32,
    /// 1-31
    pub day: u32,
}

impl CalendarFeatures {
    /// Derive every calendar field from a date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: (date.month() - 1) / 3 + 1,
            month: date.month(),
            week: date.iso_week().week(),
            weekday: date.weekday().num_days_from_monday(),
            day_of_year: date.ordinal(),
            day: date.day(),
        }
    }
}

/// Stateless timestamp parser and calendar featurizer
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarFeaturizer;

impl CalendarFeaturizer {
    /// Parse a date or date+time string.
    ///
    /// Accepts RFC 3339, ISO dates with or without a time part, and the
    /// `month/day/year hour:minute` layout used by the transaction exports.
    pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ForecastError::InvalidInput("empty timestamp".to_string()));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.naive_local());
        }
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Ok(dt);
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
                return Ok(date.and_time(chrono::NaiveTime::MIN));
            }
        }

        Err(ForecastError::InvalidInput(format!(
            "unparseable timestamp: {:?}",
            raw
        )))
    }

    /// Parse a timestamp and keep only its date
    pub fn parse_date(raw: &str) -> Result<NaiveDate> {
        Self::parse_timestamp(raw).map(|dt| dt.date())
    }

    /// Parse a timestamp and derive its calendar fields
    pub fn featurize(&self, raw: &str) -> Result<(NaiveDate, CalendarFeatures)> {
        let date = Self::parse_date(raw)?;
        Ok((date, CalendarFeatures::from_date(date)))
    }
}
