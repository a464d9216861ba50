use crate::domain::learning::{
    ModelVersion, POLYNOMIAL_REGRESSION, PredictionOutcome, RetrainingConfig, RetrainingEvent,
    TriggerReason,
};
use crate::domain::performance::{ModelPerformance, PerformanceEvaluator, RegistryStats, Stats};
use crate::infrastructure::observability::Metrics;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub const DEFAULT_RETENTION_DAYS: i64 = 90;
const RECENT_WINDOW_DAYS: i64 = 7;

/// Everything behind one lock so activation, outcome logging and the
/// retraining trigger each run as a single critical section.
struct RegistryState {
    models: HashMap<String, ModelVersion>,
    outcomes: Vec<PredictionOutcome>,
    retraining_config: RetrainingConfig,
    retraining_events: Vec<RetrainingEvent>,
}

impl RegistryState {
    fn seeded(config: RetrainingConfig, degree: usize) -> Self {
        let seed = ModelVersion::initial_polynomial(degree);
        let mut models = HashMap::new();
        models.insert(seed.id.clone(), seed);
        Self {
            models,
            outcomes: Vec::new(),
            retraining_config: config,
            retraining_events: Vec::new(),
        }
    }

    fn active(&self, model_type: &str) -> Option<&ModelVersion> {
        self.models
            .values()
            .find(|m| m.is_active && m.model_type == model_type)
    }

    fn performance(
        &self,
        model_id: &str,
        period_days: u32,
        now: DateTime<Utc>,
    ) -> Option<ModelPerformance> {
        let cutoff = now - Duration::days(i64::from(period_days));
        let outcomes: Vec<&PredictionOutcome> = self
            .outcomes
            .iter()
            .filter(|o| o.model_version == model_id && o.prediction_date >= cutoff)
            .collect();
        ModelPerformance::from_outcomes(model_id, period_days, &outcomes)
    }

    /// Register the successor of the active model unless it already exists
    fn spawn_candidate(
        &mut self,
        model_type: &str,
        reason: TriggerReason,
        average_accuracy: Option<f64>,
    ) -> Option<RetrainingEvent> {
        let Some(active) = self.active(model_type) else {
            warn!(
                "ModelRegistry: no active {} model, cannot retrain",
                model_type
            );
            return None;
        };

        let candidate = active.retrained();
        if self.models.contains_key(&candidate.id) {
            debug!(
                "ModelRegistry: candidate {} already registered, awaiting activation",
                candidate.id
            );
            return None;
        }

        let event = RetrainingEvent::new(
            model_type,
            &active.id,
            &candidate.id,
            reason,
            average_accuracy,
        );
        info!(
            "ModelRegistry: retraining {} -> {} ({}), new model is inactive until promoted",
            active.id, candidate.id, reason
        );

        self.models.insert(candidate.id.clone(), candidate);
        self.retraining_events.push(event.clone());
        Some(event)
    }
}

/// Model versions, the outcome log and the retraining trigger
pub struct ModelRegistry {
    state: RwLock<RegistryState>,
    seed_degree: usize,
    retention_days: i64,
    metrics: Option<Metrics>,
}

impl ModelRegistry {
    pub fn new(config: RetrainingConfig) -> Self {
        Self::with_seed_degree(config, 2)
    }

    pub fn with_seed_degree(config: RetrainingConfig, degree: usize) -> Self {
        Self {
            state: RwLock::new(RegistryState::seeded(config.sanitized(), degree)),
            seed_degree: degree,
            retention_days: DEFAULT_RETENTION_DAYS,
            metrics: None,
        }
    }

    pub fn with_retention_days(mut self, days: i64) -> Self {
        self.retention_days = days.max(1);
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Insert or overwrite by id. An active newcomer deactivates its siblings.
    pub async fn register(&self, model: ModelVersion) {
        let mut state = self.state.write().await;
        if model.is_active {
            for sibling in state.models.values_mut() {
                if sibling.model_type == model.model_type && sibling.id != model.id {
                    sibling.is_active = false;
                }
            }
        }
        info!(
            "ModelRegistry: registered {} ({} v{}, active={})",
            model.id, model.model_type, model.version, model.is_active
        );
        state.models.insert(model.id.clone(), model);
    }

    pub async fn get_model(&self, model_id: &str) -> Option<ModelVersion> {
        self.state.read().await.models.get(model_id).cloned()
    }

    pub async fn get_active(&self, model_type: &str) -> Option<ModelVersion> {
        self.state.read().await.active(model_type).cloned()
    }

    /// Versions of one type, oldest first
    pub async fn list_by_type(&self, model_type: &str) -> Vec<ModelVersion> {
        let state = self.state.read().await;
        let mut models: Vec<ModelVersion> = state
            .models
            .values()
            .filter(|m| m.model_type == model_type)
            .cloned()
            .collect();
        models.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        models
    }

    pub async fn all_models(&self) -> Vec<ModelVersion> {
        let state = self.state.read().await;
        let mut models: Vec<ModelVersion> = state.models.values().cloned().collect();
        models.sort_by(|a, b| {
            a.model_type
                .cmp(&b.model_type)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        models
    }

    /// Make `model_id` the only active model of its type. `false` if unknown.
    pub async fn set_active(&self, model_id: &str) -> bool {
        let mut state = self.state.write().await;
        let Some(model_type) = state.models.get(model_id).map(|m| m.model_type.clone()) else {
            warn!("ModelRegistry: cannot activate unknown model {}", model_id);
            return false;
        };

        for model in state.models.values_mut() {
            if model.model_type == model_type {
                model.is_active = model.id == model_id;
            }
        }
        info!("ModelRegistry: {} is now the active {}", model_id, model_type);
        true
    }

    /// Append an outcome, evict expired ones, then run the retraining trigger.
    pub async fn log_outcome(&self, outcome: PredictionOutcome) -> Option<RetrainingEvent> {
        let now = Utc::now();
        let mut state = self.state.write().await;

        debug!(
            "ModelRegistry: outcome {} {} via {} accuracy={:.3}",
            outcome.symbol, outcome.scenario, outcome.model_version, outcome.accuracy
        );
        let model_id = outcome.model_version.clone();
        state.outcomes.push(outcome);

        let cutoff = now - Duration::days(self.retention_days);
        let before = state.outcomes.len();
        state.outcomes.retain(|o| o.prediction_date >= cutoff);
        let evicted = before - state.outcomes.len();
        if evicted > 0 {
            debug!("ModelRegistry: evicted {} expired outcomes", evicted);
        }

        if let Some(metrics) = &self.metrics {
            let period = state.retraining_config.evaluation_period_days;
            if let Some(perf) = state.performance(&model_id, period, now) {
                metrics.set_model_accuracy(&model_id, perf.average_accuracy);
            }
        }

        self.check_retraining(&mut state, now)
    }

    fn check_retraining(
        &self,
        state: &mut RegistryState,
        now: DateTime<Utc>,
    ) -> Option<RetrainingEvent> {
        let config = state.retraining_config;
        if !config.enabled {
            return None;
        }

        let active_id = state.active(POLYNOMIAL_REGRESSION)?.id.clone();
        let performance = state.performance(&active_id, config.evaluation_period_days, now);
        let reason = PerformanceEvaluator::new(config).evaluate(performance.as_ref())?;

        debug!(
            "ModelRegistry: {} below accuracy threshold ({})",
            active_id, reason
        );
        let event = state.spawn_candidate(
            POLYNOMIAL_REGRESSION,
            reason,
            performance.map(|p| p.average_accuracy),
        )?;
        if let Some(metrics) = &self.metrics {
            metrics.inc_retraining(reason.label());
        }
        Some(event)
    }

    /// Force a new candidate for `model_type`; no-op while one is already waiting
    pub async fn trigger_retraining(
        &self,
        model_type: &str,
        reason: TriggerReason,
    ) -> Option<RetrainingEvent> {
        let now = Utc::now();
        let mut state = self.state.write().await;
        let period = state.retraining_config.evaluation_period_days;
        let average = state
            .active(model_type)
            .map(|m| m.id.clone())
            .and_then(|id| state.performance(&id, period, now))
            .map(|p| p.average_accuracy);

        let event = state.spawn_candidate(model_type, reason, average)?;
        if let Some(metrics) = &self.metrics {
            metrics.inc_retraining(reason.label());
        }
        Some(event)
    }

    /// `None` when the model has no outcomes in the period
    pub async fn get_performance(
        &self,
        model_id: &str,
        period_days: u32,
    ) -> Option<ModelPerformance> {
        self.state
            .read()
            .await
            .performance(model_id, period_days, Utc::now())
    }

    /// Performance per id, skipping models without outcomes
    pub async fn compare_performance(
        &self,
        model_ids: &[String],
        period_days: u32,
    ) -> Vec<ModelPerformance> {
        let now = Utc::now();
        let state = self.state.read().await;
        model_ids
            .iter()
            .filter_map(|id| state.performance(id, period_days, now))
            .collect()
    }

    /// Newest first
    pub async fn recent_outcomes(&self, limit: usize) -> Vec<PredictionOutcome> {
        let state = self.state.read().await;
        let mut outcomes = state.outcomes.clone();
        outcomes.sort_by(|a, b| b.actual_date.cmp(&a.actual_date));
        outcomes.truncate(limit);
        outcomes
    }

    pub async fn outcomes_for_symbol(&self, symbol: &str) -> Vec<PredictionOutcome> {
        self.state
            .read()
            .await
            .outcomes
            .iter()
            .filter(|o| o.symbol == symbol)
            .cloned()
            .collect()
    }

    pub async fn outcome_count(&self) -> usize {
        self.state.read().await.outcomes.len()
    }

    pub async fn retraining_events(&self) -> Vec<RetrainingEvent> {
        self.state.read().await.retraining_events.clone()
    }

    pub async fn retraining_config(&self) -> RetrainingConfig {
        self.state.read().await.retraining_config
    }

    /// Applies immediately; out-of-range values are clamped
    pub async fn update_retraining_config(&self, config: RetrainingConfig) {
        let sanitized = config.sanitized();
        if sanitized != config {
            warn!(
                "ModelRegistry: retraining config {:?} out of range, clamped to {:?}",
                config, sanitized
            );
        }
        let mut state = self.state.write().await;
        info!(
            "ModelRegistry: retraining config {:?} -> {:?}",
            state.retraining_config, sanitized
        );
        state.retraining_config = sanitized;
    }

    pub async fn stats(&self) -> RegistryStats {
        let state = self.state.read().await;
        let cutoff = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
        let recent: Vec<f64> = state
            .outcomes
            .iter()
            .filter(|o| o.prediction_date >= cutoff)
            .map(|o| o.accuracy)
            .collect();

        RegistryStats {
            total_models: state.models.len(),
            active_models: state.models.values().filter(|m| m.is_active).count(),
            total_predictions: state.outcomes.len(),
            recent_predictions: recent.len(),
            average_accuracy: Stats::mean(&recent),
        }
    }

    /// Drop every model and outcome and reseed the baseline model
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        let config = state.retraining_config;
        *state = RegistryState::seeded(config, self.seed_degree);
        info!("ModelRegistry: reset to baseline model");
    }
}
