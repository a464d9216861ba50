use crate::domain::prediction::ScenarioKind;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Accuracy of a single price forecast: `max(0, 1 - |predicted - actual| / actual)`.
///
/// Zero when the actual price is not positive.
pub fn prediction_accuracy(predicted: Decimal, actual: Decimal) -> f64 {
    if actual <= Decimal::ZERO {
        return 0.0;
    }
    let relative_error = ((predicted - actual).abs() / actual)
        .to_f64()
        .unwrap_or(f64::INFINITY);
    (1.0 - relative_error).max(0.0)
}

/// A matured prediction scored against the observed price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionOutcome {
    pub id: String,
    pub symbol: String,
    pub model_version: String,
    pub predicted_price: Decimal,
    pub actual_price: Decimal,
    /// Close at prediction time, when the snapshot carried one
    #[serde(default)]
    pub reference_price: Option<Decimal>,
    pub prediction_date: DateTime<Utc>,
    pub target_date: DateTime<Utc>,
    pub actual_date: DateTime<Utc>,
    pub scenario: ScenarioKind,
    pub accuracy: f64,
}

impl PredictionOutcome {
    /// |actual - predicted| / actual, `None` when actual is not positive
    pub fn relative_error(&self) -> Option<f64> {
        if self.actual_price <= Decimal::ZERO {
            return None;
        }
        ((self.actual_price - self.predicted_price).abs() / self.actual_price).to_f64()
    }

    /// Whether predicted and realized moves from the reference price agree in sign
    pub fn direction_correct(&self) -> Option<bool> {
        let reference = self.reference_price?;
        let predicted_move = self.predicted_price - reference;
        let actual_move = self.actual_price - reference;
        Some(predicted_move.cmp(&Decimal::ZERO) == actual_move.cmp(&Decimal::ZERO))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingStatus {
    /// Waiting for its target date
    Pending,
    /// Claimed by a sweep; the price lookup is in flight
    Resolving,
    /// Outcome emitted; purged at the end of the sweep
    Logged,
}

/// An issued forecast awaiting its target date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPrediction {
    pub id: String,
    pub symbol: String,
    pub model_version: String,
    pub scenario: ScenarioKind,
    pub predicted_price: Decimal,
    #[serde(default)]
    pub reference_price: Option<Decimal>,
    pub prediction_date: DateTime<Utc>,
    pub target_date: DateTime<Utc>,
    pub confidence: f64,
    pub status: PendingStatus,
}

impl PendingPrediction {
    /// Key format: `{symbol}-{timestamp}-{scenario}`
    pub fn key(symbol: &str, prediction_date: DateTime<Utc>, scenario: ScenarioKind) -> String {
        format!("{}-{}-{}", symbol, prediction_date.timestamp_millis(), scenario)
    }

    pub fn is_logged(&self) -> bool {
        self.status == PendingStatus::Logged
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == PendingStatus::Pending && self.target_date <= now
    }

    /// Score against an observed price
    pub fn resolve(&self, actual_price: Decimal, actual_date: DateTime<Utc>) -> PredictionOutcome {
        PredictionOutcome {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: self.symbol.clone(),
            model_version: self.model_version.clone(),
            predicted_price: self.predicted_price,
            actual_price,
            reference_price: self.reference_price,
            prediction_date: self.prediction_date,
            target_date: self.target_date,
            actual_date,
            scenario: self.scenario,
            accuracy: prediction_accuracy(self.predicted_price, actual_price),
        }
    }
}
