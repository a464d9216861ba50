//! Push-based metrics reporter for Stockcast
//!
//! Periodically outputs learning-loop state as structured JSON to stdout.
//!
//! **Security**: This system only SENDS data, never accepts requests.

use crate::application::learning::ContinuousLearningController;
use crate::domain::learning::POLYNOMIAL_REGRESSION;
use crate::domain::performance::RegistryStats;
use crate::infrastructure::observability::metrics::Metrics;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Metrics snapshot for JSON output
#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub registry: RegistryStats,
    pub learning: LearningSnapshot,
}

#[derive(Serialize)]
pub struct LearningSnapshot {
    pub active_model: Option<String>,
    pub pending_predictions: usize,
    pub ab_test_id: Option<String>,
    pub retraining_events: usize,
}

/// Push-based metrics reporter
///
/// Outputs metrics as structured JSON logs on a configurable interval.
/// No HTTP server, no incoming connections - only outbound data.
pub struct MetricsReporter {
    controller: Arc<ContinuousLearningController>,
    metrics: Metrics,
    start_time: Instant,
    interval: Duration,
}

impl MetricsReporter {
    pub fn new(
        controller: Arc<ContinuousLearningController>,
        metrics: Metrics,
        interval_seconds: u64,
    ) -> Self {
        Self {
            controller,
            metrics,
            start_time: Instant::now(),
            interval: Duration::from_secs(interval_seconds.max(1)),
        }
    }

    /// Run the reporter in a loop, outputting metrics periodically
    pub async fn run(self) {
        info!(
            "MetricsReporter: Starting push-based metrics (interval: {:?})",
            self.interval
        );

        loop {
            tokio::time::sleep(self.interval).await;

            let snapshot = self.collect_snapshot().await;
            match serde_json::to_string(&snapshot) {
                Ok(json) => {
                    // Use a special prefix so logs can be easily filtered
                    println!("METRICS_JSON:{}", json);
                    info!(
                        "Models: {} | Outcomes (7d): {} @ {:.3} | Pending: {} | Uptime: {}s",
                        snapshot.registry.total_models,
                        snapshot.registry.recent_predictions,
                        snapshot.registry.average_accuracy,
                        snapshot.learning.pending_predictions,
                        snapshot.uptime_seconds
                    );
                }
                Err(e) => warn!("Failed to serialize metrics: {}", e),
            }
        }
    }

    /// Collect current metrics snapshot
    async fn collect_snapshot(&self) -> MetricsSnapshot {
        let registry = self.controller.registry();
        let stats = registry.stats().await;
        let pending = self.controller.logger().pending_count().await;
        let ab_test_id = self.controller.current_ab_test().await.map(|t| t.id);

        self.metrics.pending_predictions.set(pending as i64);
        self.metrics.set_ab_test_running(ab_test_id.is_some());

        MetricsSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            registry: stats,
            learning: LearningSnapshot {
                active_model: registry
                    .get_active(POLYNOMIAL_REGRESSION)
                    .await
                    .map(|m| m.id),
                pending_predictions: pending,
                ab_test_id,
                retraining_events: registry.retraining_events().await.len(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::learning::{ModelRegistry, PerformanceLogger};
    use crate::domain::learning::{ABTestConfig, RetrainingConfig};
    use crate::infrastructure::mock::MockPriceProvider;
    use crate::infrastructure::random::FixedRandomSource;

    fn controller() -> Arc<ContinuousLearningController> {
        let registry = Arc::new(ModelRegistry::new(RetrainingConfig::default()));
        let logger = Arc::new(PerformanceLogger::new(
            registry.clone(),
            Arc::new(MockPriceProvider::new()),
        ));
        Arc::new(ContinuousLearningController::new(
            registry,
            logger,
            Arc::new(FixedRandomSource::new(50.0)),
            ABTestConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_metrics_snapshot_collection() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        let reporter = MetricsReporter::new(controller(), metrics, 60);

        let snapshot = reporter.collect_snapshot().await;

        assert_eq!(snapshot.registry.total_models, 1);
        assert_eq!(snapshot.learning.pending_predictions, 0);
        assert_eq!(
            snapshot.learning.active_model.as_deref(),
            Some("polynomial-regression-v1.0.0")
        );
        assert!(snapshot.learning.ab_test_id.is_none());
        assert!(!snapshot.timestamp.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_serialization() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        let reporter = MetricsReporter::new(controller(), metrics, 60);
        let snapshot = reporter.collect_snapshot().await;

        let json = serde_json::to_string(&snapshot).expect("Failed to serialize");
        assert!(json.contains("totalModels"));
        assert!(json.contains("pending_predictions"));
    }
}
