use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three named forecast branches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Conservative,
    Bullish,
    Bearish,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [
        ScenarioKind::Conservative,
        ScenarioKind::Bullish,
        ScenarioKind::Bearish,
    ];
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioKind::Conservative => write!(f, "conservative"),
            ScenarioKind::Bullish => write!(f, "bullish"),
            ScenarioKind::Bearish => write!(f, "bearish"),
        }
    }
}

impl FromStr for ScenarioKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conservative" => Ok(ScenarioKind::Conservative),
            "bullish" => Ok(ScenarioKind::Bullish),
            "bearish" => Ok(ScenarioKind::Bearish),
            _ => anyhow::bail!(
                "Invalid scenario: {}. Must be 'conservative', 'bullish' or 'bearish'",
                s
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionScenario {
    pub target_price: Decimal,
    pub timeframe: String,
    /// Probability in [0, 1]
    pub probability: f64,
    pub factors: Vec<String>,
    pub confidence_interval: (Decimal, Decimal),
    pub standard_error: f64,
}

/// Look-back fit quality, not held-out validation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyMetrics {
    pub r_squared: f64,
    pub rmse: f64,
    pub mape: f64,
    pub confidence_interval: (f64, f64),
}

/// Conservative / bullish / bearish triple produced by the scenario generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub conservative: PredictionScenario,
    pub bullish: PredictionScenario,
    pub bearish: PredictionScenario,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub symbol: String,
    pub conservative: PredictionScenario,
    pub bullish: PredictionScenario,
    pub bearish: PredictionScenario,
    pub accuracy: AccuracyMetrics,
    /// Overall confidence in [0, 1]
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl PredictionResult {
    pub fn scenario(&self, kind: ScenarioKind) -> &PredictionScenario {
        match kind {
            ScenarioKind::Conservative => &self.conservative,
            ScenarioKind::Bullish => &self.bullish,
            ScenarioKind::Bearish => &self.bearish,
        }
    }

    pub fn scenarios(&self) -> impl Iterator<Item = (ScenarioKind, &PredictionScenario)> {
        ScenarioKind::ALL.into_iter().map(|k| (k, self.scenario(k)))
    }
}
