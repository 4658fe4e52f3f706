//! Inference module
//!
//! Per-request forecasting:
//! - Prediction input/output contracts
//! - Model collaborator trait and shipped forecasters
//! - Service combining online feature assembly with a model

mod forecaster;
mod request;
mod service;

pub use forecaster::{Forecaster, LinearForecaster, SeasonalNaiveForecaster};
pub use request::{PredictionRequest, PredictionResponse};
pub use service::ForecastService;
