//! Prometheus metrics definitions for Stockcast
//!
//! All metrics use the `stockcast_` prefix and are read-only.

use prometheus::{
    CounterVec, Gauge, GaugeVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder, core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Prometheus metrics for the prediction and learning loop
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Predictions logged, by serving model version
    pub predictions_total: IntCounterVec,
    /// Forecast calls that returned an error
    pub prediction_failures_total: IntCounter,
    /// Outcomes resolved, by scenario
    pub outcomes_logged_total: IntCounterVec,
    /// Pending predictions awaiting their target date
    pub pending_predictions: IntGauge,
    /// Price lookups that failed during an outcome sweep
    pub price_fetch_failures_total: IntCounterVec,
    /// Retraining events, by reason
    pub retraining_triggers_total: CounterVec,
    /// Live average accuracy per model (0-1)
    pub model_average_accuracy: GaugeVec,
    /// A/B test status (0=idle, 1=running)
    pub ab_test_running: GenericGauge<AtomicF64>,
    /// Treatments promoted by a concluded A/B test
    pub ab_test_promotions_total: IntCounter,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let predictions_total = IntCounterVec::new(
            Opts::new(
                "stockcast_predictions_total",
                "Total predictions logged by model version",
            ),
            &["model_version"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let prediction_failures_total = IntCounter::with_opts(Opts::new(
            "stockcast_prediction_failures_total",
            "Total forecast failures",
        ))?;
        registry.register(Box::new(prediction_failures_total.clone()))?;

        let outcomes_logged_total = IntCounterVec::new(
            Opts::new(
                "stockcast_outcomes_logged_total",
                "Total prediction outcomes resolved by scenario",
            ),
            &["scenario"],
        )?;
        registry.register(Box::new(outcomes_logged_total.clone()))?;

        let pending_predictions = IntGauge::with_opts(Opts::new(
            "stockcast_pending_predictions",
            "Predictions awaiting their target date",
        ))?;
        registry.register(Box::new(pending_predictions.clone()))?;

        let price_fetch_failures_total = IntCounterVec::new(
            Opts::new(
                "stockcast_price_fetch_failures_total",
                "Price lookups that failed during outcome sweeps",
            ),
            &["symbol"],
        )?;
        registry.register(Box::new(price_fetch_failures_total.clone()))?;

        let retraining_triggers_total = CounterVec::new(
            Opts::new(
                "stockcast_retraining_triggers_total",
                "Total retraining events by reason",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(retraining_triggers_total.clone()))?;

        let model_average_accuracy = GaugeVec::new(
            Opts::new(
                "stockcast_model_average_accuracy",
                "Live average prediction accuracy per model (0-1)",
            ),
            &["model_id"],
        )?;
        registry.register(Box::new(model_average_accuracy.clone()))?;

        let ab_test_running = Gauge::with_opts(Opts::new(
            "stockcast_ab_test_running",
            "A/B test status (0=idle, 1=running)",
        ))?;
        registry.register(Box::new(ab_test_running.clone()))?;

        let ab_test_promotions_total = IntCounter::with_opts(Opts::new(
            "stockcast_ab_test_promotions_total",
            "Treatment models promoted by A/B tests",
        ))?;
        registry.register(Box::new(ab_test_promotions_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            predictions_total,
            prediction_failures_total,
            outcomes_logged_total,
            pending_predictions,
            price_fetch_failures_total,
            retraining_triggers_total,
            model_average_accuracy,
            ab_test_running,
            ab_test_promotions_total,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_predictions(&self, model_version: &str) {
        self.predictions_total
            .with_label_values(&[model_version])
            .inc();
    }

    pub fn inc_outcomes(&self, scenario: &str) {
        self.outcomes_logged_total
            .with_label_values(&[scenario])
            .inc();
    }

    pub fn inc_price_fetch_failures(&self, symbol: &str) {
        self.price_fetch_failures_total
            .with_label_values(&[symbol])
            .inc();
    }

    pub fn inc_retraining(&self, reason: &str) {
        self.retraining_triggers_total
            .with_label_values(&[reason])
            .inc();
    }

    /// Update live accuracy for a specific model
    pub fn set_model_accuracy(&self, model_id: &str, accuracy: f64) {
        self.model_average_accuracy
            .with_label_values(&[model_id])
            .set(accuracy);
    }

    pub fn set_ab_test_running(&self, running: bool) {
        self.ab_test_running.set(if running { 1.0 } else { 0.0 });
    }
}
