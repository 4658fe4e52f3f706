//! Application state management

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{ForecastError, Result};
use crate::features::HistoricalFeatureTable;
use crate::inference::{ForecastService, Forecaster, LinearForecaster, SeasonalNaiveForecaster};
use crate::storage::{CsvHistoryStore, HistoryStore};

use super::ServerConfig;

/// Application state shared across handlers.
///
/// The historical table is an immutable snapshot behind an `Arc`; a reload
/// swaps the pointer, so requests already running keep the table they started
/// with.
pub struct AppState {
    pub config: ServerConfig,
    pub service: ForecastService,
    store: Arc<dyn HistoryStore>,
    history: RwLock<Option<Arc<HistoricalFeatureTable>>>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        service: ForecastService,
        store: Arc<dyn HistoryStore>,
        history: Option<HistoricalFeatureTable>,
    ) -> Self {
        Self {
            config,
            service,
            store,
            history: RwLock::new(history.map(Arc::new)),
        }
    }

    /// Wire up the model and storage named by `config`, loading the table once.
    ///
    /// A missing table is not fatal: predictions answer "unavailable" until a
    /// reload succeeds.
    pub fn from_config(config: ServerConfig) -> Result<Self> {
        let forecaster: Arc<dyn Forecaster> = match &config.model_path {
            Some(path) => Arc::new(LinearForecaster::from_json_file(path)?),
            None => {
                warn!("No MODEL_PATH configured, serving seasonal-naive forecasts");
                Arc::new(SeasonalNaiveForecaster)
            }
        };
        let store: Arc<dyn HistoryStore> = Arc::new(CsvHistoryStore::new(&config.history_path));

        let history = match store.load() {
            Ok(table) => Some(table),
            Err(e) => {
                warn!(error = %e, "Starting without historical data");
                None
            }
        };

        Ok(Self::new(config, ForecastService::new(forecaster), store, history))
    }

    /// Current table snapshot
    pub async fn snapshot(&self) -> Result<Arc<HistoricalFeatureTable>> {
        self.history.read().await.clone().ok_or_else(|| {
            ForecastError::DataUnavailable("historical feature table has not been loaded".to_string())
        })
    }

    /// Swap in a new table
    pub async fn replace_history(&self, table: HistoricalFeatureTable) {
        let rows = table.len();
        *self.history.write().await = Some(Arc::new(table));
        info!(rows, "Historical feature table swapped");
    }

    /// Re-read the table from storage and swap it in
    pub async fn reload_history(&self) -> Result<usize> {
        let store = Arc::clone(&self.store);
        let table = tokio::task::spawn_blocking(move || store.load())
            .await
            .map_err(|e| ForecastError::DataUnavailable(format!("reload task failed: {}", e)))??;
        let rows = table.len();
        self.replace_history(table).await;
        Ok(rows)
    }
}
