//! Stockcast Server - Headless forecasting and learning loop
//!
//! This binary forecasts every snapshot in `SNAPSHOT_DIR`, resolves matured
//! predictions against fresh snapshots, and retrains when accuracy drops.
//! Metrics are pushed via structured JSON logs to stdout.
//!
//! # Usage
//! ```sh
//! SNAPSHOT_DIR=data/snapshots OBSERVABILITY_INTERVAL=60 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `SNAPSHOT_DIR` - Directory of `<SYMBOL>.json` snapshots (default: data/snapshots)
//! - `PREDICTION_TIMEFRAME` - Forecast horizon (default: 30d)
//! - `OUTCOME_SWEEP_INTERVAL_SECS` - Seconds between forecast and outcome sweeps (default: 3600)
//! - `OBSERVABILITY_ENABLED` - Enable metrics reporting (default: true)
//! - `OBSERVABILITY_INTERVAL` - Interval in seconds between metric outputs (default: 60)

use anyhow::Result;
use stockcast::application::system::Application;
use stockcast::config::Config;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Stockcast Server {} starting...", env!("CARGO_PKG_VERSION"));
    info!("Metrics: Push-based (JSON to stdout)");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: Snapshots={}, Horizon={}, Degree={}",
        config.snapshot_dir.display(),
        config.timeframe,
        config.polynomial_degree
    );

    let app = Application::build(config.clone()).await?;
    let mut handle = app.start().await?;
    info!("Learning loop running. Press Ctrl+C to shutdown.");

    let mut ticker = tokio::time::interval(config.sweep_interval());
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match handle.run_forecasts().await {
                    Ok(run) => info!(
                        "Forecast run: {} issued, {} failed",
                        run.issued.len(),
                        run.failed.len()
                    ),
                    Err(e) => warn!("Forecast run failed: {:#}", e),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("Received Ctrl+C signal.");
                break;
            }
        }
    }

    handle.shutdown_service().shutdown().await;
    handle.stop().await;
    info!("Shutdown sequence completed. Exiting.");

    Ok(())
}
