//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::ForecastError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Data unavailable: {0}")]
    Unavailable(String),

    #[error("Prediction failed: {0}")]
    PredictionFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ForecastError> for ServerError {
    fn from(err: ForecastError) -> Self {
        match err {
            ForecastError::InvalidInput(msg) => ServerError::BadRequest(msg),
            ForecastError::DataUnavailable(msg) => ServerError::Unavailable(msg),
            ForecastError::PredictionFailed(msg) => ServerError::PredictionFailed(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Unavailable(msg) => {
                tracing::warn!(detail = %msg, "Historical data unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Historical data is not available".to_string(),
                )
            }
            ServerError::PredictionFailed(msg) => {
                tracing::error!(detail = %msg, "Model failed to predict");
                (StatusCode::BAD_GATEWAY, "Model failed to produce a forecast".to_string())
            }
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ForecastError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (ForecastError::DataUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (ForecastError::PredictionFailed("x".into()), StatusCode::BAD_GATEWAY),
            (ForecastError::DataError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            let response = ServerError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }
}
