//! Sales Forecast - Main Entry Point
//!
//! Builds the historical feature table, exports training splits and serves
//! forecasts over HTTP.

use clap::Parser;
use sales_forecast::cli::{
    cmd_features, cmd_predict, cmd_prepare, cmd_serve, cmd_split, Cli, Commands,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sales_forecast=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Prepare { input, output, config, no_save } => {
            cmd_prepare(&input, &output, config.as_deref(), no_save)?;
        }
        Commands::Split { history, output_dir, horizon_days } => {
            cmd_split(&history, &output_dir, horizon_days)?;
        }
        Commands::Features { history, date, stock_code } => {
            cmd_features(&history, &date, stock_code)?;
        }
        Commands::Predict { history, date, stock_code, model } => {
            cmd_predict(&history, &date, stock_code, model.as_deref())?;
        }
        Commands::Serve { host, port, history } => {
            cmd_serve(host, port, history).await?;
        }
    }

    Ok(())
}
