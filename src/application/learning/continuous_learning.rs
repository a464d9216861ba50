use super::model_registry::ModelRegistry;
use super::performance_logger::PerformanceLogger;
use crate::application::ml::PredictionOrchestrator;
use crate::domain::errors::PredictionError;
use crate::domain::learning::{
    ABTest, ABTestConfig, ABTestEvaluation, ABTestResult, ABTestStatus, ModelVersion,
    POLYNOMIAL_REGRESSION, RetrainingConfig, Variant,
};
use crate::domain::market::StockSnapshot;
use crate::domain::ports::{Forecaster, RandomSource};
use crate::domain::prediction::PredictionResult;
use crate::infrastructure::observability::Metrics;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Routes live traffic between model versions and runs the single A/B test
pub struct ContinuousLearningController {
    registry: Arc<ModelRegistry>,
    logger: Arc<PerformanceLogger>,
    random: Arc<dyn RandomSource>,
    ab_config: RwLock<ABTestConfig>,
    current_test: Mutex<Option<ABTest>>,
    model_type: String,
    metrics: Option<Metrics>,
}

impl ContinuousLearningController {
    pub fn new(
        registry: Arc<ModelRegistry>,
        logger: Arc<PerformanceLogger>,
        random: Arc<dyn RandomSource>,
        ab_config: ABTestConfig,
    ) -> Self {
        Self {
            registry,
            logger,
            random,
            ab_config: RwLock::new(ab_config.sanitized()),
            current_test: Mutex::new(None),
            model_type: POLYNOMIAL_REGRESSION.to_string(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn logger(&self) -> &Arc<PerformanceLogger> {
        &self.logger
    }

    /// `false` if a test is already running or either model is unknown
    pub async fn start_ab_test(
        &self,
        control_model_id: &str,
        treatment_model_id: &str,
        config: ABTestConfig,
    ) -> bool {
        let mut current = self.current_test.lock().await;
        if let Some(test) = current.as_ref() {
            warn!(
                "ContinuousLearning: A/B test {} already running ({} vs {})",
                test.id, test.control_model_id, test.treatment_model_id
            );
            return false;
        }

        for model_id in [control_model_id, treatment_model_id] {
            if self.registry.get_model(model_id).await.is_none() {
                warn!(
                    "ContinuousLearning: cannot start A/B test, unknown model {}",
                    model_id
                );
                return false;
            }
        }

        let test = ABTest::new(
            control_model_id,
            treatment_model_id,
            config.sanitized(),
            Utc::now(),
        );
        info!(
            "ContinuousLearning: A/B test {} started: control={} treatment={} split={}% until {}",
            test.id,
            test.control_model_id,
            test.treatment_model_id,
            test.config.traffic_split_percent,
            test.end_date
        );
        *current = Some(test);
        self.set_running_gauge(true);
        true
    }

    /// Model id that should serve the next prediction
    pub async fn select_model_version(&self) -> String {
        if self.ab_config.read().await.enabled {
            let current = self.current_test.lock().await;
            if let Some(test) = current.as_ref() {
                let draw = self.random.next_percent();
                let chosen = if draw < test.config.traffic_split_percent {
                    &test.treatment_model_id
                } else {
                    &test.control_model_id
                };
                debug!("ContinuousLearning: draw {:.2} -> {}", draw, chosen);
                return chosen.clone();
            }
        }

        match self.registry.get_active(&self.model_type).await {
            Some(model) => model.id,
            None => {
                let fallback = ModelVersion::model_id(&self.model_type, "1.0.0");
                warn!(
                    "ContinuousLearning: no active {} model, tagging as {}",
                    self.model_type, fallback
                );
                fallback
            }
        }
    }

    /// Log a prediction under a freshly selected model version
    pub async fn process_prediction(
        &self,
        snapshot: &StockSnapshot,
        result: &PredictionResult,
    ) -> Result<Option<ABTestResult>, PredictionError> {
        let model_version = self.select_model_version().await;
        self.process_prediction_with(snapshot, result, &model_version)
            .await
    }

    /// Log a prediction served by `model_version` and update the running test.
    ///
    /// Returns the test result when this prediction ended the test early.
    pub async fn process_prediction_with(
        &self,
        snapshot: &StockSnapshot,
        result: &PredictionResult,
        model_version: &str,
    ) -> Result<Option<ABTestResult>, PredictionError> {
        self.logger
            .log_prediction(result, snapshot, model_version)
            .await?;
        if let Some(metrics) = &self.metrics {
            metrics.inc_predictions(model_version);
        }

        let mut current = self.current_test.lock().await;
        let Some(test) = current.as_mut() else {
            return Ok(None);
        };

        // Confidence stands in for accuracy until outcomes mature
        if let Some(variant) = test.variant_for(model_version) {
            test.metrics_mut(variant).record(result.confidence);
        }

        let significant = test.has_min_samples() && test.evaluate().significant;
        let expired = test.is_expired(Utc::now());
        if !(significant || expired) {
            return Ok(None);
        }
        info!(
            "ContinuousLearning: A/B test {} ending early (significant={}, expired={})",
            test.id, significant, expired
        );

        // Promotion completes before the test slot is released
        match current.take() {
            Some(test) => Ok(Some(self.conclude(test, ABTestStatus::Completed).await)),
            None => Ok(None),
        }
    }

    /// Forecast with the selected model version, then log and score it
    pub async fn predict_and_process(
        &self,
        snapshot: &StockSnapshot,
        timeframe: &str,
    ) -> Result<PredictionResult, PredictionError> {
        let model_version = self.select_model_version().await;
        let forecaster = self.forecaster_for(&model_version).await;

        let result = match forecaster.predict(snapshot, timeframe) {
            Ok(result) => result,
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.prediction_failures_total.inc();
                }
                warn!(
                    "ContinuousLearning: {} forecast for {} failed: {}",
                    model_version, snapshot.symbol, e
                );
                return Err(e);
            }
        };

        self.process_prediction_with(snapshot, &result, &model_version)
            .await?;
        Ok(result)
    }

    async fn forecaster_for(&self, model_id: &str) -> Box<dyn Forecaster> {
        match self.registry.get_model(model_id).await {
            Some(model) => Box::new(PredictionOrchestrator::for_model(&model)),
            None => Box::new(PredictionOrchestrator::default()),
        }
    }

    /// Stop the running test, promoting the treatment only on a significant win
    pub async fn stop_ab_test(&self) -> Option<ABTestResult> {
        let mut current = self.current_test.lock().await;
        match current.take() {
            Some(test) => Some(self.conclude(test, ABTestStatus::Stopped).await),
            None => {
                warn!("ContinuousLearning: no A/B test to stop");
                None
            }
        }
    }

    pub fn evaluate_ab_test(&self, test: &ABTest) -> ABTestEvaluation {
        test.evaluate()
    }

    /// Called with `current_test` held; takes the registry lock only
    async fn conclude(&self, mut test: ABTest, status: ABTestStatus) -> ABTestResult {
        test.control_metrics.finalize();
        test.treatment_metrics.finalize();
        test.status = status;
        let evaluation = test.evaluate();

        let promoted = if evaluation.winner == Variant::Treatment && evaluation.significant {
            self.registry.set_active(&test.treatment_model_id).await
        } else {
            false
        };

        if promoted {
            if let Some(metrics) = &self.metrics {
                metrics.ab_test_promotions_total.inc();
            }
            info!(
                "ContinuousLearning: A/B test {} promoted {} ({:+.2}%)",
                test.id, test.treatment_model_id, evaluation.improvement
            );
        } else {
            info!(
                "ContinuousLearning: A/B test {} ended without promotion (winner={}, improvement={:+.2}%, significant={})",
                test.id, evaluation.winner, evaluation.improvement, evaluation.significant
            );
        }
        self.set_running_gauge(false);

        ABTestResult {
            test,
            evaluation,
            promoted,
        }
    }

    pub async fn current_ab_test(&self) -> Option<ABTest> {
        self.current_test.lock().await.clone()
    }

    pub async fn ab_test_config(&self) -> ABTestConfig {
        *self.ab_config.read().await
    }

    /// Applies to selection immediately and to tests started afterwards
    pub async fn update_ab_test_config(&self, config: ABTestConfig) {
        let sanitized = config.sanitized();
        if sanitized != config {
            warn!(
                "ContinuousLearning: A/B config {:?} out of range, clamped to {:?}",
                config, sanitized
            );
        }
        let mut current = self.ab_config.write().await;
        info!(
            "ContinuousLearning: A/B config {:?} -> {:?}",
            *current, sanitized
        );
        *current = sanitized;
    }

    pub async fn retraining_config(&self) -> RetrainingConfig {
        self.registry.retraining_config().await
    }

    pub async fn update_retraining_config(&self, config: RetrainingConfig) {
        self.registry.update_retraining_config(config).await;
    }

    fn set_running_gauge(&self, running: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.set_ab_test_running(running);
        }
    }
}
