use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// When the registry should spawn a new model version
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrainingConfig {
    /// Average accuracy below which retraining fires, in [0, 1]
    pub accuracy_threshold: f64,
    pub min_predictions: usize,
    pub evaluation_period_days: u32,
    pub enabled: bool,
}

impl Default for RetrainingConfig {
    fn default() -> Self {
        Self {
            accuracy_threshold: 0.6,
            min_predictions: 10,
            evaluation_period_days: 30,
            enabled: true,
        }
    }
}

impl RetrainingConfig {
    /// Copy with every field forced into its valid range
    pub fn sanitized(&self) -> Self {
        Self {
            accuracy_threshold: if self.accuracy_threshold.is_finite() {
                self.accuracy_threshold.clamp(0.0, 1.0)
            } else {
                Self::default().accuracy_threshold
            },
            min_predictions: self.min_predictions,
            evaluation_period_days: self.evaluation_period_days.max(1),
            enabled: self.enabled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerReason {
    PoorAccuracy, // Average accuracy under threshold
    Manual,       // Operator forced
}

impl TriggerReason {
    /// Metric label form
    pub fn label(&self) -> &'static str {
        match self {
            TriggerReason::PoorAccuracy => "poor_accuracy",
            TriggerReason::Manual => "manual",
        }
    }
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerReason::PoorAccuracy => write!(f, "Poor Accuracy"),
            TriggerReason::Manual => write!(f, "Manual"),
        }
    }
}

/// Record of why and from what a new model version was spawned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrainingEvent {
    pub id: String,
    pub model_type: String,
    pub previous_model_id: String,
    pub new_model_id: String,
    pub reason: TriggerReason,
    pub average_accuracy: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl RetrainingEvent {
    pub fn new(
        model_type: &str,
        previous_model_id: &str,
        new_model_id: &str,
        reason: TriggerReason,
        average_accuracy: Option<f64>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            model_type: model_type.to_string(),
            previous_model_id: previous_model_id.to_string(),
            new_model_id: new_model_id.to_string(),
            reason,
            average_accuracy,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_clamps() {
        let config = RetrainingConfig {
            accuracy_threshold: 1.7,
            min_predictions: 3,
            evaluation_period_days: 0,
            enabled: true,
        }
        .sanitized();

        assert_eq!(config.accuracy_threshold, 1.0);
        assert_eq!(config.evaluation_period_days, 1);
        assert_eq!(config.min_predictions, 3);

        let nan = RetrainingConfig {
            accuracy_threshold: f64::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(nan.accuracy_threshold, 0.6);
    }
}
