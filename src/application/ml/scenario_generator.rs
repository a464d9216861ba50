use crate::domain::errors::PredictionError;
use crate::domain::market::Timeframe;
use crate::domain::ml::{FeatureVector, SentimentSignals};
use crate::domain::prediction::{PredictionScenario, ScenarioKind, ScenarioSet};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::FromPrimitive;
use tracing::debug;

const CONSERVATIVE_MULTIPLIER: f64 = 0.7;
const BULLISH_MULTIPLIER: f64 = 1.5;
const BEARISH_MULTIPLIER: f64 = 0.5;
const POLITICAL_BOOST: f64 = 0.1;

/// Daily returns used for the scenario standard error
const VOLATILITY_WINDOW: usize = 20;
const Z_95: f64 = 1.96;

/// Turns a base trajectory plus sentiment into three calibrated scenarios
#[derive(Debug, Clone, Default)]
pub struct ScenarioGenerator;

impl ScenarioGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(
        &self,
        base_trajectory: &[f64],
        features: &FeatureVector,
        timeframe: &Timeframe,
    ) -> Result<ScenarioSet, PredictionError> {
        let last_price = features
            .last_price()
            .ok_or(PredictionError::InsufficientData {
                required: 1,
                available: 0,
            })?;
        if last_price <= 0.0 || !last_price.is_finite() {
            return Err(PredictionError::ModelFit {
                reason: format!("last observed price {} is not positive", last_price),
            });
        }

        let base_target = base_trajectory.last().copied().unwrap_or(last_price);
        let base_change = (base_target - last_price) / last_price;

        let signals = SentimentSignals::from_features(features);
        let volatility = features.return_volatility(VOLATILITY_WINDOW);
        let days = timeframe.to_days();

        debug!(
            "ScenarioGenerator[{}]: last={:.2} base={:.2} change={:.4} signals={:?}",
            features.symbol, last_price, base_target, base_change, signals
        );

        let build = |kind: ScenarioKind| -> Result<PredictionScenario, PredictionError> {
            let change = Self::scenario_change(kind, base_change, &signals);
            let target = last_price * (1.0 + change);
            let standard_error = target.abs() * volatility * f64::from(days).sqrt();

            let mut factors = signals.notable_factors();
            factors.extend(Self::boilerplate(kind).iter().map(|s| s.to_string()));

            Ok(PredictionScenario {
                target_price: to_cents(target)?,
                timeframe: timeframe.to_string(),
                probability: Self::probability(kind, &signals),
                factors,
                confidence_interval: (
                    to_cents((target - Z_95 * standard_error).max(0.0))?,
                    to_cents(target + Z_95 * standard_error)?,
                ),
                standard_error,
            })
        };

        Ok(ScenarioSet {
            conservative: build(ScenarioKind::Conservative)?,
            bullish: build(ScenarioKind::Bullish)?,
            bearish: build(ScenarioKind::Bearish)?,
        })
    }

    /// Only political sentiment moves the bullish/bearish targets
    fn scenario_change(kind: ScenarioKind, base_change: f64, signals: &SentimentSignals) -> f64 {
        match kind {
            ScenarioKind::Conservative => base_change * CONSERVATIVE_MULTIPLIER,
            ScenarioKind::Bullish => {
                base_change * BULLISH_MULTIPLIER + signals.political.max(0.0) * POLITICAL_BOOST
            }
            ScenarioKind::Bearish => {
                base_change * BEARISH_MULTIPLIER + signals.political.min(0.0) * POLITICAL_BOOST
            }
        }
    }

    fn probability(kind: ScenarioKind, signals: &SentimentSignals) -> f64 {
        match kind {
            ScenarioKind::Conservative => (0.6 + signals.mean() * 0.1).clamp(0.3, 0.9),
            ScenarioKind::Bullish => {
                (0.4 + 0.1 * signals.positive_count() as f64).clamp(0.2, 0.8)
            }
            ScenarioKind::Bearish => {
                (0.3 + 0.1 * signals.negative_count() as f64).clamp(0.2, 0.7)
            }
        }
    }

    fn boilerplate(kind: ScenarioKind) -> [&'static str; 2] {
        match kind {
            ScenarioKind::Conservative => [
                "Polynomial trend dampened to 70%",
                "Assumes stable market conditions",
            ],
            ScenarioKind::Bullish => [
                "Polynomial trend extended to 150%",
                "Upside if positive catalysts materialize",
            ],
            ScenarioKind::Bearish => [
                "Polynomial trend cut to 50%",
                "Downside if sentiment deteriorates",
            ],
        }
    }
}

fn to_cents(value: f64) -> Result<Decimal, PredictionError> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .ok_or_else(|| PredictionError::ModelFit {
            reason: format!("forecast value {} is not representable", value),
        })
}
