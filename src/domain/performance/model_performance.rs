use super::stats::Stats;
use crate::domain::learning::PredictionOutcome;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Relative error at or under which an outcome counts as a success
pub const SUCCESS_RELATIVE_ERROR: f64 = 0.10;

/// Aggregated live accuracy of one model version over a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPerformance {
    pub model_id: String,
    pub period_days: u32,
    pub total_predictions: usize,
    pub average_accuracy: f64,
    pub rmse: f64,
    /// Percent
    pub mape: f64,
    /// Percent of outcomes within `SUCCESS_RELATIVE_ERROR`
    pub success_rate: f64,
    /// Percent of outcomes whose move matched the predicted direction;
    /// `None` when no outcome carried a reference price
    pub directional_accuracy: Option<f64>,
    pub last_updated: DateTime<Utc>,
}

impl ModelPerformance {
    /// `None` for an empty outcome set
    pub fn from_outcomes(
        model_id: &str,
        period_days: u32,
        outcomes: &[&PredictionOutcome],
    ) -> Option<Self> {
        if outcomes.is_empty() {
            return None;
        }

        let accuracies: Vec<f64> = outcomes.iter().map(|o| o.accuracy).collect();
        let actual: Vec<f64> = outcomes
            .iter()
            .map(|o| o.actual_price.to_f64().unwrap_or(0.0))
            .collect();
        let predicted: Vec<f64> = outcomes
            .iter()
            .map(|o| o.predicted_price.to_f64().unwrap_or(0.0))
            .collect();

        let successes = outcomes
            .iter()
            .filter(|o| {
                o.relative_error()
                    .is_some_and(|e| e <= SUCCESS_RELATIVE_ERROR)
            })
            .count();

        let directions: Vec<bool> = outcomes
            .iter()
            .filter_map(|o| o.direction_correct())
            .collect();
        let directional_accuracy = if directions.is_empty() {
            None
        } else {
            let hits = directions.iter().filter(|hit| **hit).count();
            Some(hits as f64 / directions.len() as f64 * 100.0)
        };

        Some(Self {
            model_id: model_id.to_string(),
            period_days,
            total_predictions: outcomes.len(),
            average_accuracy: Stats::mean(&accuracies),
            rmse: Stats::rmse(&actual, &predicted),
            mape: Stats::mape(&actual, &predicted),
            success_rate: successes as f64 / outcomes.len() as f64 * 100.0,
            directional_accuracy,
            last_updated: Utc::now(),
        })
    }
}

/// Aggregate registry view for dashboards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total_models: usize,
    pub active_models: usize,
    pub total_predictions: usize,
    /// Outcomes predicted within the last 7 days
    pub recent_predictions: usize,
    /// Mean accuracy of the last 7 days' outcomes, 0 when there are none
    pub average_accuracy: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::ScenarioKind;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn outcome(predicted: Decimal, actual: Decimal, accuracy: f64) -> PredictionOutcome {
        let now = Utc::now();
        PredictionOutcome {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: "AAPL".to_string(),
            model_version: "m1".to_string(),
            predicted_price: predicted,
            actual_price: actual,
            reference_price: None,
            prediction_date: now,
            target_date: now,
            actual_date: now,
            scenario: ScenarioKind::Conservative,
            accuracy,
        }
    }

    #[test]
    fn test_empty_is_none() {
        assert!(ModelPerformance::from_outcomes("m1", 30, &[]).is_none());
    }

    #[test]
    fn test_aggregates() {
        let a = outcome(dec!(105), dec!(100), 0.95);
        let b = outcome(dec!(120), dec!(100), 0.80);
        let perf = ModelPerformance::from_outcomes("m1", 30, &[&a, &b]).unwrap();

        assert_eq!(perf.total_predictions, 2);
        assert!((perf.average_accuracy - 0.875).abs() < 1e-12);
        // sqrt((25 + 400) / 2)
        assert!((perf.rmse - 212.5_f64.sqrt()).abs() < 1e-9);
        assert!((perf.mape - 12.5).abs() < 1e-9);
        assert!((perf.success_rate - 50.0).abs() < 1e-12);
        assert!(perf.directional_accuracy.is_none());
    }

    #[test]
    fn test_directional_accuracy() {
        let mut a = outcome(dec!(110), dec!(105), 0.95);
        a.reference_price = Some(dec!(100));
        let mut b = outcome(dec!(110), dec!(95), 0.84);
        b.reference_price = Some(dec!(100));

        let perf = ModelPerformance::from_outcomes("m1", 30, &[&a, &b]).unwrap();
        assert_eq!(perf.directional_accuracy, Some(50.0));
    }
}
