//! One-shot forecast CLI
//!
//! Fits a polynomial trend to a stock snapshot and prints the three
//! scenarios as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use stockcast::application::ml::{PolynomialFitter, PredictionOrchestrator};
use stockcast::config::MAX_POLYNOMIAL_DEGREE;
use stockcast::domain::market::{StockSnapshot, Timeframe};
use stockcast::infrastructure::csv_loader;
use stockcast::infrastructure::snapshot_source::parse_snapshot;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Polynomial price forecast for a single stock", long_about = None)]
struct Cli {
    /// JSON stock snapshot (camelCase, as written by the data pipeline)
    #[arg(long, conflicts_with = "prices")]
    snapshot: Option<PathBuf>,

    /// CSV of daily bars (date, open, high, low, close, adjClose, volume)
    #[arg(long, requires = "symbol")]
    prices: Option<PathBuf>,

    /// Symbol for --prices input
    #[arg(short, long)]
    symbol: Option<String>,

    /// Forecast horizon such as 30d, 2w or 3m
    #[arg(short, long, default_value = "30d")]
    timeframe: String,

    /// Polynomial degree
    #[arg(short, long, default_value = "2")]
    degree: usize,
}

fn load(cli: &Cli) -> Result<StockSnapshot> {
    if let Some(path) = &cli.snapshot {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return parse_snapshot(&raw);
    }
    match (&cli.prices, &cli.symbol) {
        (Some(path), Some(symbol)) => csv_loader::load_snapshot(symbol, path),
        _ => anyhow::bail!("Provide either --snapshot <FILE> or --prices <CSV> --symbol <SYMBOL>"),
    }
}

fn main() -> Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();
    if cli.degree == 0 || cli.degree > MAX_POLYNOMIAL_DEGREE {
        anyhow::bail!("--degree must be between 1 and {}", MAX_POLYNOMIAL_DEGREE);
    }
    let timeframe: Timeframe = cli.timeframe.parse()?;

    let snapshot = load(&cli)?;
    info!(
        "Forecasting {} over {} ({} bars, degree {})",
        snapshot.symbol,
        timeframe,
        snapshot.market_data.prices.len(),
        cli.degree
    );

    let orchestrator = PredictionOrchestrator::new(PolynomialFitter::new(cli.degree));
    let result = orchestrator.predict_with(&snapshot, &timeframe)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
