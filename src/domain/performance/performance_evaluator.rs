use crate::domain::learning::{RetrainingConfig, TriggerReason};
use crate::domain::performance::model_performance::ModelPerformance;

/// Decides whether live performance warrants a new model version
pub struct PerformanceEvaluator {
    config: RetrainingConfig,
}

impl PerformanceEvaluator {
    pub fn new(config: RetrainingConfig) -> Self {
        Self { config }
    }

    /// Check if measured performance triggers retraining
    pub fn evaluate(&self, performance: Option<&ModelPerformance>) -> Option<TriggerReason> {
        if !self.config.enabled {
            return None;
        }

        // Not enough evidence yet
        let performance = performance?;
        if performance.total_predictions < self.config.min_predictions {
            return None;
        }

        if performance.average_accuracy < self.config.accuracy_threshold {
            return Some(TriggerReason::PoorAccuracy);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn performance(total: usize, average_accuracy: f64) -> ModelPerformance {
        ModelPerformance {
            model_id: "m1".to_string(),
            period_days: 30,
            total_predictions: total,
            average_accuracy,
            rmse: 0.0,
            mape: 0.0,
            success_rate: 0.0,
            directional_accuracy: None,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_poor_accuracy_trigger() {
        let evaluator = PerformanceEvaluator::new(RetrainingConfig {
            accuracy_threshold: 0.6,
            min_predictions: 1,
            ..Default::default()
        });

        assert_eq!(
            evaluator.evaluate(Some(&performance(1, 0.25))),
            Some(TriggerReason::PoorAccuracy)
        );
        assert_eq!(evaluator.evaluate(Some(&performance(1, 0.9))), None);
    }

    #[test]
    fn test_min_predictions_gate() {
        let evaluator = PerformanceEvaluator::new(RetrainingConfig {
            min_predictions: 10,
            ..Default::default()
        });
        assert_eq!(evaluator.evaluate(Some(&performance(9, 0.1))), None);
        assert_eq!(evaluator.evaluate(None), None);
    }

    #[test]
    fn test_disabled() {
        let evaluator = PerformanceEvaluator::new(RetrainingConfig {
            enabled: false,
            min_predictions: 0,
            ..Default::default()
        });
        assert_eq!(evaluator.evaluate(Some(&performance(50, 0.0))), None);
    }
}
