//! Sales Forecast CLI Module
//!
//! Command-line interface for building the historical table, exporting the
//! training split, inspecting online features and serving forecasts.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::aggregation::{AggregatorConfig, HistoricalAggregator};
use crate::inference::{
    ForecastService, Forecaster, LinearForecaster, PredictionRequest, SeasonalNaiveForecaster,
};
use crate::storage::{load_transactions, write_csv, CsvHistoryStore, HistoryStore};
use crate::timeseries::{CalendarFeaturizer, EntityId, TrainValSplit, DEFAULT_HORIZON_DAYS};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "sales-forecast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Daily sales demand forecasting: feature table builder and forecast server")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the historical feature table from raw transactions
    Prepare {
        /// Raw transaction CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output historical table CSV
        #[arg(short, long, default_value = "./data/historical_data.csv")]
        output: PathBuf,

        /// Aggregator configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Build and report without writing the table
        #[arg(long)]
        no_save: bool,
    },

    /// Export the train/validation split of a historical table
    Split {
        /// Historical table CSV
        #[arg(long)]
        history: PathBuf,

        /// Directory receiving train.csv and validation.csv
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Days held out for validation
        #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS)]
        horizon_days: i64,
    },

    /// Print the online feature vector for one record
    Features {
        /// Historical table CSV
        #[arg(long)]
        history: PathBuf,

        /// Request date (YYYY-MM-DD or a timestamp)
        #[arg(short, long)]
        date: String,

        /// Reduced stock code
        #[arg(short, long)]
        stock_code: EntityId,
    },

    /// Forecast the quantity for one record
    Predict {
        /// Historical table CSV
        #[arg(long)]
        history: PathBuf,

        /// Request date (YYYY-MM-DD or a timestamp)
        #[arg(short, long)]
        date: String,

        /// Reduced stock code
        #[arg(short, long)]
        stock_code: EntityId,

        /// Linear model JSON; seasonal-naive when omitted
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Start the forecast server
    Serve {
        /// Server host
        #[arg(long)]
        host: Option<String>,

        /// Server port
        #[arg(short, long)]
        port: Option<u16>,

        /// Historical table CSV
        #[arg(long)]
        history: Option<String>,
    },
}

// ─── Helpers ───────────────────────────────────────────────────────────────────

fn load_history(path: &Path) -> anyhow::Result<crate::features::HistoricalFeatureTable> {
    step_run(&format!("Loading {}", path.display()));
    let start = Instant::now();
    let table = CsvHistoryStore::new(path).load()?;
    step_done(&format!(
        "{} rows · {} stock codes in {:?}",
        table.len(),
        table.n_entities(),
        start.elapsed()
    ));
    Ok(table)
}

fn request_for(date: &str, stock_code: EntityId) -> anyhow::Result<PredictionRequest> {
    let date = CalendarFeaturizer::parse_date(date)?;
    Ok(PredictionRequest::new(date, stock_code))
}

fn load_forecaster(model: Option<&Path>) -> anyhow::Result<Arc<dyn Forecaster>> {
    Ok(match model {
        Some(path) => Arc::new(LinearForecaster::from_json_file(path)?),
        None => Arc::new(SeasonalNaiveForecaster),
    })
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_prepare(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    no_save: bool,
) -> anyhow::Result<()> {
    section("Prepare");

    let config = match config {
        Some(path) => AggregatorConfig::from_json_file(path)?,
        None => AggregatorConfig::default(),
    };
    let aggregator = HistoricalAggregator::new(config);

    step_run("Loading transactions");
    let start = Instant::now();
    let records = load_transactions(input)?;
    step_done(&format!("{} rows in {:?}", records.len(), start.elapsed()));

    step_run("Building feature table");
    let start = Instant::now();
    let table = aggregator.build(&records)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    println!("  {:<16} {}", muted("Rows"), table.len().to_string().white().bold());
    println!("  {:<16} {}", muted("Stock codes"), table.n_entities().to_string().white());
    if let Some(max_date) = table.max_date() {
        println!("  {:<16} {}", muted("Last date"), max_date.to_string().white());
    }
    println!();

    if no_save {
        println!("  {}", dim("--no-save given, table not written"));
        println!();
        return Ok(());
    }

    step_run(&format!("Saving → {}", output.display()));
    CsvHistoryStore::new(output).save(&table)?;
    step_done("");
    println!();
    Ok(())
}

pub fn cmd_split(history: &Path, output_dir: &Path, horizon_days: i64) -> anyhow::Result<()> {
    section("Split");
    if horizon_days < 0 {
        anyhow::bail!("--horizon-days must not be negative, got {}", horizon_days);
    }

    let table = load_history(history)?;

    step_run(&format!("Splitting at {} days", horizon_days));
    let split = TrainValSplit::from_table(&table, horizon_days)?;
    step_done(&format!("cutoff {}", split.cutoff));

    std::fs::create_dir_all(output_dir)?;
    for (name, side) in [("train", &split.train), ("validation", &split.validation)] {
        let path = output_dir.join(format!("{}.csv", name));
        step_run(&format!("Saving → {}", path.display()));
        let mut df = side.to_dataframe()?;
        write_csv(&mut df, &path)?;
        step_done(&format!("{} rows", side.n_rows()));
    }

    println!();
    Ok(())
}

pub fn cmd_features(history: &Path, date: &str, stock_code: EntityId) -> anyhow::Result<()> {
    let request = request_for(date, stock_code)?;
    let table = CsvHistoryStore::new(history).load()?;
    let service = ForecastService::new(Arc::new(SeasonalNaiveForecaster));
    let features = service.features(&table, &request);
    println!("{}", serde_json::to_string_pretty(&features.to_json())?);
    Ok(())
}

pub fn cmd_predict(
    history: &Path,
    date: &str,
    stock_code: EntityId,
    model: Option<&Path>,
) -> anyhow::Result<()> {
    section("Predict");

    let request = request_for(date, stock_code)?;
    let table = load_history(history)?;
    let service = ForecastService::new(load_forecaster(model)?);

    let response = service.predict(&table, &request)?;

    println!();
    println!("  {:<16} {}", muted("Date"), request.date.to_string().white());
    println!("  {:<16} {}", muted("StockCode"), request.stock_code.to_string().white());
    println!("  {:<16} {}", muted("Quantity"), format!("{:.4}", response.quantity).white().bold());
    println!("  {:<16} {}", muted("Model"), response.model_version.white());
    println!();
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(
    host: Option<String>,
    port: Option<u16>,
    history: Option<String>,
) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    let defaults = ServerConfig::default();
    let config = ServerConfig {
        host: host.unwrap_or(defaults.host),
        port: port.unwrap_or(defaults.port),
        history_path: history.unwrap_or(defaults.history_path),
        model_path: defaults.model_path,
    };

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Sales Forecast".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Predict", &format!("http://{}:{}/api/predict", config.host, config.port)));
    line_box(&kv("Health ", &format!("http://{}:{}/api/health", config.host, config.port)));
    line_box(&kv("History", &config.history_path));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    run_server(config).await
}
