//! Forecast HTTP server
//!
//! Thin serving shell around [`crate::inference::ForecastService`]: request
//! parsing, status mapping and the lifecycle of the model and the historical
//! table snapshot.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub history_path: String,
    pub model_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(9696),
            history_path: std::env::var("HISTORY_PATH")
                .unwrap_or_else(|_| "./data/historical_data.csv".to_string()),
            model_path: std::env::var("MODEL_PATH").ok().filter(|p| !p.is_empty()),
        }
    }
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        history_path = %config.history_path,
        model_path = ?config.model_path,
        "Initializing forecast server"
    );

    let state = Arc::new(AppState::from_config(config.clone())?);
    let app = create_router(state.clone());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        address = %addr,
        model_version = state.service.model_version(),
        started_at = %start_time.to_rfc3339(),
        "Forecast server starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl+c");
            return;
        }
        let uptime = chrono::Utc::now().signed_duration_since(start_time);
        info!(uptime_secs = uptime.num_seconds(), "Shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
