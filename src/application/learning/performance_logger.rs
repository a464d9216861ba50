use super::model_registry::ModelRegistry;
use crate::domain::errors::{OutcomeError, PredictionError};
use crate::domain::learning::{PendingPrediction, PendingStatus, PredictionOutcome};
use crate::domain::market::{StockSnapshot, Timeframe};
use crate::domain::ports::PriceProvider;
use crate::domain::prediction::PredictionResult;
use crate::infrastructure::observability::Metrics;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result of one outcome sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSummary {
    pub resolved: usize,
    pub failed_symbols: Vec<String>,
}

/// Running periodic sweep and its stop signal
struct SweepTask {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl SweepTask {
    /// Signal the loop and wait for a sweep in progress to finish
    async fn stop(self) {
        // Err only when the loop has already exited
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            warn!("PerformanceLogger: sweep task ended abnormally: {}", e);
        }
    }
}

/// Tracks issued forecasts and scores them once their target date passes
pub struct PerformanceLogger {
    registry: Arc<ModelRegistry>,
    price_provider: Arc<dyn PriceProvider>,
    pending: RwLock<HashMap<String, PendingPrediction>>,
    // Periodic sweep; stopped cooperatively so claimed records are never stranded
    task: Mutex<Option<SweepTask>>,
    metrics: Option<Metrics>,
}

impl PerformanceLogger {
    pub fn new(registry: Arc<ModelRegistry>, price_provider: Arc<dyn PriceProvider>) -> Self {
        Self {
            registry,
            price_provider,
            pending: RwLock::new(HashMap::new()),
            task: Mutex::new(None),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Record one pending prediction per scenario, all due at the same target date.
    ///
    /// Returns the number of records created.
    pub async fn log_prediction(
        &self,
        result: &PredictionResult,
        snapshot: &StockSnapshot,
        model_version: &str,
    ) -> Result<usize, PredictionError> {
        let timeframe: Timeframe = result.conservative.timeframe.parse()?;
        let prediction_date = result.timestamp;
        let target_date = prediction_date + timeframe.to_duration();
        let reference_price = snapshot.last_close().and_then(Decimal::from_f64);

        let records: Vec<PendingPrediction> = result
            .scenarios()
            .map(|(kind, scenario)| PendingPrediction {
                id: PendingPrediction::key(&result.symbol, prediction_date, kind),
                symbol: result.symbol.clone(),
                model_version: model_version.to_string(),
                scenario: kind,
                predicted_price: scenario.target_price,
                reference_price,
                prediction_date,
                target_date,
                confidence: result.confidence,
                status: PendingStatus::Pending,
            })
            .collect();

        let created = records.len();
        let mut pending = self.pending.write().await;
        for record in records {
            pending.insert(record.id.clone(), record);
        }
        self.update_pending_gauge(&pending);

        debug!(
            "PerformanceLogger: {} predictions for {} via {} due {}",
            created, result.symbol, model_version, target_date
        );
        Ok(created)
    }

    /// Resolve every matured prediction.
    ///
    /// Records are claimed before any price lookup, so overlapping sweeps never
    /// score the same prediction twice. A failed lookup releases that symbol's
    /// claims for the next sweep without affecting other symbols.
    pub async fn check_and_log_outcomes(&self) -> SweepSummary {
        let now = Utc::now();
        let claimed = self.claim(|p| p.is_due(now)).await;

        if claimed.is_empty() {
            debug!("PerformanceLogger: no matured predictions");
            return SweepSummary::default();
        }

        let mut by_symbol: HashMap<String, Vec<PendingPrediction>> = HashMap::new();
        for record in claimed {
            by_symbol
                .entry(record.symbol.clone())
                .or_default()
                .push(record);
        }

        info!(
            "PerformanceLogger: resolving {} symbols with matured predictions",
            by_symbol.len()
        );

        let lookups = join_all(by_symbol.keys().map(|symbol| async move {
            (symbol.clone(), self.fetch_price(symbol).await)
        }))
        .await;

        let mut summary = SweepSummary::default();
        for (symbol, price) in lookups {
            let records = by_symbol.remove(&symbol).unwrap_or_default();
            match price {
                Ok(price) => {
                    let outcomes = self.resolve(&records, price).await;
                    summary.resolved += outcomes.len();
                }
                Err(e) => {
                    warn!("PerformanceLogger: skipping {}: {}", symbol, e);
                    if let Some(metrics) = &self.metrics {
                        metrics.inc_price_fetch_failures(&symbol);
                    }
                    self.release(&records).await;
                    summary.failed_symbols.push(symbol);
                }
            }
        }

        summary.failed_symbols.sort();
        self.purge_logged().await;

        info!(
            "PerformanceLogger: sweep resolved {} outcomes, {} symbols failed",
            summary.resolved,
            summary.failed_symbols.len()
        );
        summary
    }

    /// Resolve every unresolved prediction for `symbol` now, matured or not
    pub async fn force_check_outcomes(
        &self,
        symbol: &str,
    ) -> Result<Vec<PredictionOutcome>, OutcomeError> {
        let claimed = self
            .claim(|p| p.symbol == symbol && p.status == PendingStatus::Pending)
            .await;

        let price = match self.fetch_price(symbol).await {
            Ok(price) => price,
            Err(e) => {
                self.release(&claimed).await;
                if let Some(metrics) = &self.metrics {
                    metrics.inc_price_fetch_failures(symbol);
                }
                return Err(e);
            }
        };

        let outcomes = self.resolve(&claimed, price).await;
        self.purge_logged().await;
        info!(
            "PerformanceLogger: forced {} outcomes for {}",
            outcomes.len(),
            symbol
        );
        Ok(outcomes)
    }

    /// Predictions not yet resolved
    pub async fn pending_count(&self) -> usize {
        self.pending
            .read()
            .await
            .values()
            .filter(|p| !p.is_logged())
            .count()
    }

    pub async fn pending_predictions(&self) -> Vec<PendingPrediction> {
        let mut records: Vec<PendingPrediction> =
            self.pending.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.target_date.cmp(&b.target_date).then(a.id.cmp(&b.id)));
        records
    }

    /// Spawn the recurring sweep, replacing any running one.
    ///
    /// A replaced task finishes its current sweep before the new one starts.
    pub async fn start_periodic_logging(self: &Arc<Self>, interval: Duration) {
        let mut task_guard = self.task.lock().await;
        if let Some(task) = task_guard.take() {
            debug!("PerformanceLogger: Stopping previous sweep task");
            task.stop().await;
        }

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let logger = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown_rx.changed() => break,
                }
                // Never interrupted: claims are resolved or released before the next check
                logger.check_and_log_outcomes().await;
            }
            debug!("PerformanceLogger: sweep loop exited");
        });

        *task_guard = Some(SweepTask { handle, shutdown });
        info!(
            "PerformanceLogger: periodic outcome sweep every {:?}",
            interval
        );
    }

    /// Stop the recurring sweep, waiting for a sweep in progress.
    /// `false` if none was running.
    pub async fn stop_periodic_logging(&self) -> bool {
        let task = self.task.lock().await.take();
        match task {
            Some(task) => {
                task.stop().await;
                info!("PerformanceLogger: periodic outcome sweep stopped");
                true
            }
            None => false,
        }
    }

    pub async fn is_periodic_logging(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// Mark matching records `Resolving` and return copies of them
    async fn claim<F>(&self, select: F) -> Vec<PendingPrediction>
    where
        F: Fn(&PendingPrediction) -> bool,
    {
        let mut pending = self.pending.write().await;
        pending
            .values_mut()
            .filter(|p| select(p))
            .map(|p| {
                p.status = PendingStatus::Resolving;
                p.clone()
            })
            .collect()
    }

    async fn release(&self, records: &[PendingPrediction]) {
        let mut pending = self.pending.write().await;
        for record in records {
            if let Some(p) = pending.get_mut(&record.id)
                && p.status == PendingStatus::Resolving
            {
                p.status = PendingStatus::Pending;
            }
        }
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Decimal, OutcomeError> {
        match self.price_provider.latest_price(symbol).await {
            Ok(Some(price)) => Ok(price),
            Ok(None) => Err(OutcomeError::PriceUnavailable {
                symbol: symbol.to_string(),
                reason: "no quote returned".to_string(),
            }),
            Err(e) => Err(OutcomeError::PriceUnavailable {
                symbol: symbol.to_string(),
                reason: format!("{:#}", e),
            }),
        }
    }

    async fn resolve(&self, records: &[PendingPrediction], price: Decimal) -> Vec<PredictionOutcome> {
        let actual_date: DateTime<Utc> = Utc::now();
        let mut outcomes = Vec::with_capacity(records.len());

        for record in records {
            let outcome = record.resolve(price, actual_date);
            if let Some(metrics) = &self.metrics {
                metrics.inc_outcomes(&outcome.scenario.to_string());
            }
            self.registry.log_outcome(outcome.clone()).await;

            if let Some(p) = self.pending.write().await.get_mut(&record.id) {
                p.status = PendingStatus::Logged;
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn purge_logged(&self) {
        let mut pending = self.pending.write().await;
        pending.retain(|_, p| !p.is_logged());
        self.update_pending_gauge(&pending);
    }

    fn update_pending_gauge(&self, pending: &HashMap<String, PendingPrediction>) {
        if let Some(metrics) = &self.metrics {
            metrics.pending_predictions.set(pending.len() as i64);
        }
    }
}
