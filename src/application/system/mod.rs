use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub mod shutdown_service;

use crate::application::learning::{ContinuousLearningController, ModelRegistry, PerformanceLogger};
use crate::application::system::shutdown_service::ShutdownService;
use crate::config::Config;
use crate::domain::ports::{PriceProvider, RandomSource};
use crate::domain::prediction::PredictionResult;
use crate::infrastructure::observability::{Metrics, MetricsReporter};
use crate::infrastructure::random::{SeededRandomSource, ThreadRngSource};
use crate::infrastructure::snapshot_source::FileSnapshotSource;

/// Outcome of forecasting every snapshot in the input directory once
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRun {
    pub issued: Vec<String>,
    pub failed: Vec<String>,
}

pub struct SystemHandle {
    pub controller: Arc<ContinuousLearningController>,
    pub registry: Arc<ModelRegistry>,
    pub logger: Arc<PerformanceLogger>,
    pub snapshots: Arc<FileSnapshotSource>,
    pub metrics: Metrics,
    pub config: Config,
    reporter_handle: Option<JoinHandle<()>>,
}

impl SystemHandle {
    /// Forecast, log and score every snapshot on disk
    pub async fn run_forecasts(&self) -> Result<ForecastRun> {
        let snapshots = self.snapshots.load_all().await?;
        let timeframe = self.config.timeframe.to_string();
        let mut run = ForecastRun::default();

        for snapshot in &snapshots {
            match self
                .controller
                .predict_and_process(snapshot, &timeframe)
                .await
            {
                Ok(result) => {
                    info!(
                        "Forecast {} ({}): conservative {} / bullish {} / bearish {} (confidence {:.2})",
                        result.symbol,
                        timeframe,
                        result.conservative.target_price,
                        result.bullish.target_price,
                        result.bearish.target_price,
                        result.confidence
                    );
                    run.issued.push(snapshot.symbol.clone());
                }
                Err(e) => {
                    warn!("Forecast for {} skipped: {}", snapshot.symbol, e);
                    run.failed.push(snapshot.symbol.clone());
                }
            }
        }
        Ok(run)
    }

    pub fn shutdown_service(&self) -> ShutdownService {
        ShutdownService::new(self.controller.clone())
    }

    /// Stop background work without the final sweep
    pub async fn stop(&mut self) {
        self.logger.stop_periodic_logging().await;
        if let Some(handle) = self.reporter_handle.take() {
            handle.abort();
        }
    }
}

pub struct Application {
    pub config: Config,
    pub metrics: Metrics,
    pub registry: Arc<ModelRegistry>,
    pub logger: Arc<PerformanceLogger>,
    pub controller: Arc<ContinuousLearningController>,
    pub snapshots: Arc<FileSnapshotSource>,
}

impl Application {
    /// Wire the learning loop against snapshot files on disk
    pub async fn build(config: Config) -> Result<Self> {
        let snapshots = Arc::new(FileSnapshotSource::new(config.snapshot_dir.clone()));
        let provider: Arc<dyn PriceProvider> = snapshots.clone();
        let random: Arc<dyn RandomSource> = match config.ab_test_seed {
            Some(seed) => {
                info!("A/B traffic split seeded with {}", seed);
                Arc::new(SeededRandomSource::new(seed))
            }
            None => Arc::new(ThreadRngSource),
        };
        Self::build_with(config, snapshots, provider, random).await
    }

    /// Same wiring with an explicit quote source and traffic splitter
    pub async fn build_with(
        config: Config,
        snapshots: Arc<FileSnapshotSource>,
        price_provider: Arc<dyn PriceProvider>,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self> {
        info!(
            "Building Stockcast Application (horizon: {}, degree: {})...",
            config.timeframe, config.polynomial_degree
        );

        let metrics = Metrics::new()?;

        let registry = Arc::new(
            ModelRegistry::with_seed_degree(config.retraining, config.polynomial_degree)
                .with_retention_days(config.outcome_retention_days)
                .with_metrics(metrics.clone()),
        );
        let logger = Arc::new(
            PerformanceLogger::new(registry.clone(), price_provider).with_metrics(metrics.clone()),
        );
        let controller = Arc::new(
            ContinuousLearningController::new(
                registry.clone(),
                logger.clone(),
                random,
                config.ab_test,
            )
            .with_metrics(metrics.clone()),
        );

        Ok(Self {
            config,
            metrics,
            registry,
            logger,
            controller,
            snapshots,
        })
    }

    pub async fn start(self) -> Result<SystemHandle> {
        info!(
            "Starting outcome sweep every {}s...",
            self.config.outcome_sweep_interval_secs
        );
        self.logger
            .start_periodic_logging(self.config.sweep_interval())
            .await;

        let reporter_handle = if self.config.observability_enabled {
            let reporter = MetricsReporter::new(
                self.controller.clone(),
                self.metrics.clone(),
                self.config.observability_interval_secs,
            );
            Some(tokio::spawn(reporter.run()))
        } else {
            info!("Metrics reporter disabled (OBSERVABILITY_ENABLED=false)");
            None
        };

        Ok(SystemHandle {
            controller: self.controller,
            registry: self.registry,
            logger: self.logger,
            snapshots: self.snapshots,
            metrics: self.metrics,
            config: self.config,
            reporter_handle,
        })
    }
}
