//! Sales Forecast - daily demand forecasting for retail transactions
//!
//! This crate turns raw sales transactions into a per-product daily feature
//! table and serves quantity forecasts from it:
//! - Cleaning and daily aggregation of transactions
//! - Percentile outlier trimming
//! - Lag and rolling-mean features shared by batch and online paths
//! - Forecast service, HTTP server and CLI
//!
//! # Modules
//!
//! ## Core
//! - [`timeseries`] - Calendar fields, grouped lag/rolling windows, train split
//! - [`aggregation`] - Historical aggregator (clean, aggregate, trim, featurize)
//! - [`features`] - Feature engineer, historical table, online assembler
//! - [`inference`] - Prediction contract, forecasters, forecast service
//! - [`storage`] - CSV persistence of the historical table and raw loading
//!
//! ## Services
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Feature pipeline
pub mod timeseries;
pub mod aggregation;
pub mod features;
pub mod storage;
pub mod inference;

// Services
pub mod server;
pub mod cli;

pub use error::{ForecastError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{ForecastError, Result};

    // Time series
    pub use crate::timeseries::{
        CalendarFeatures, EntityId, GroupedLagWindow, GroupedRollingStat, TimeSeriesTable,
        TrainValSplit,
    };

    // Aggregation
    pub use crate::aggregation::{
        AggregatorConfig, CleaningRules, DailyAggregate, HistoricalAggregator, TransactionRecord,
        TrimConfig,
    };

    // Features
    pub use crate::features::{
        FeatureEngineer, FeatureRow, FeatureVector, HistoricalFeatureTable,
        OnlineFeatureAssembler, FEATURE_COLUMNS, SENTINEL,
    };

    // Storage
    pub use crate::storage::{CsvHistoryStore, HistoryStore};

    // Inference
    pub use crate::inference::{
        ForecastService, Forecaster, LinearForecaster, PredictionRequest, PredictionResponse,
        SeasonalNaiveForecaster,
    };
}
