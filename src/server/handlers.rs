//! HTTP request handlers

use std::sync::Arc;
use axum::{body::Bytes, extract::State, Json};
use serde_json::json;
use tracing::Instrument;
use uuid::Uuid;

use crate::inference::{PredictionRequest, PredictionResponse};

use super::error::{Result, ServerError};
use super::state::AppState;

/// Forecast one `(Date, StockCode)` record
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PredictionResponse>> {
    let body: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| ServerError::BadRequest(format!("request body is not valid JSON: {}", e)))?;
    let request_id = Uuid::new_v4();
    async move {
        let request = PredictionRequest::from_json(body)?;
        let history = state.snapshot().await?;
        let response = state.service.predict(&history, &request)?;
        Ok::<_, ServerError>(Json(response))
    }
    .instrument(tracing::info_span!("predict", %request_id))
    .await
}

/// Re-read the historical table from storage
pub async fn reload_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>> {
    let rows = state.reload_history().await?;
    Ok(Json(json!({
        "success": true,
        "rows": rows,
    })))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let history_rows = state.snapshot().await.ok().map(|table| table.len());
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model_version": state.service.model_version(),
        "history_loaded": history_rows.is_some(),
        "history_rows": history_rows,
    }))
}
