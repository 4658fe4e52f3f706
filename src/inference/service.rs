//! Request to forecast: feature assembly plus model call

use super::forecaster::Forecaster;
use super::request::{PredictionRequest, PredictionResponse};
use crate::error::{ForecastError, Result};
use crate::features::{FeatureEngineer, FeatureVector, HistoricalFeatureTable, OnlineFeatureAssembler};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Serves forecasts for an explicitly supplied model and history snapshot.
///
/// Holds no request-to-request state; callers own the model lifecycle and
/// pass the historical table they want each call to read.
#[derive(Clone)]
pub struct ForecastService {
    forecaster: Arc<dyn Forecaster>,
    engineer: FeatureEngineer,
}

impl std::fmt::Debug for ForecastService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastService")
            .field("model_version", &self.forecaster.version())
            .finish()
    }
}

impl ForecastService {
    pub fn new(forecaster: Arc<dyn Forecaster>) -> Self {
        Self {
            forecaster,
            engineer: FeatureEngineer::default(),
        }
    }

    pub fn model_version(&self) -> &str {
        self.forecaster.version()
    }

    /// Feature vector the model will see for `request`
    pub fn features(&self, history: &HistoricalFeatureTable, request: &PredictionRequest) -> FeatureVector {
        OnlineFeatureAssembler::new(history)
            .with_engineer(self.engineer)
            .assemble(request)
    }

    pub fn predict(
        &self,
        history: &HistoricalFeatureTable,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse> {
        let start = Instant::now();
        let features = self.features(history, request);

        let quantity = self.forecaster.predict(&features).map_err(|e| match e {
            ForecastError::PredictionFailed(_) => e,
            other => ForecastError::PredictionFailed(other.to_string()),
        })?;
        if !quantity.is_finite() {
            return Err(ForecastError::PredictionFailed(format!(
                "model returned non-finite forecast {}",
                quantity
            )));
        }

        info!(
            stock_code = request.stock_code,
            date = %request.date,
            quantity,
            model_version = self.model_version(),
            latency_us = start.elapsed().as_micros() as u64,
            "Forecast served"
        );

        Ok(PredictionResponse {
            quantity,
            model_version: self.model_version().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::SeasonalNaiveForecaster;
    use chrono::NaiveDate;

    struct BrokenModel;

    impl Forecaster for BrokenModel {
        fn predict(&self, _features: &FeatureVector) -> Result<f64> {
            Err(ForecastError::DataError("wrong shape".to_string()))
        }

        fn version(&self) -> &str {
            "broken"
        }
    }

    struct NanModel;

    impl Forecaster for NanModel {
        fn predict(&self, _features: &FeatureVector) -> Result<f64> {
            Ok(f64::NAN)
        }

        fn version(&self) -> &str {
            "nan"
        }
    }

    fn request() -> PredictionRequest {
        PredictionRequest::new(NaiveDate::from_ymd_opt(2011, 12, 10).unwrap(), 85123)
    }

    #[test]
    fn test_cold_start_prediction() {
        let service = ForecastService::new(Arc::new(SeasonalNaiveForecaster));
        let response = service.predict(&HistoricalFeatureTable::default(), &request()).unwrap();

        assert_eq!(response.quantity, 0.0);
        assert_eq!(response.model_version, "seasonal-naive");
    }

    #[test]
    fn test_model_errors_become_prediction_failed() {
        let table = HistoricalFeatureTable::default();

        let err = ForecastService::new(Arc::new(BrokenModel)).predict(&table, &request()).unwrap_err();
        assert!(matches!(err, ForecastError::PredictionFailed(_)));

        let err = ForecastService::new(Arc::new(NanModel)).predict(&table, &request()).unwrap_err();
        assert!(matches!(err, ForecastError::PredictionFailed(_)));
    }
}
