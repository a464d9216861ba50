use super::feature_extractor::FeatureExtractor;
use super::polynomial_fitter::PolynomialFitter;
use super::scenario_generator::ScenarioGenerator;
use crate::domain::errors::PredictionError;
use crate::domain::learning::model_version::{ModelVersion, POLYNOMIAL_REGRESSION};
use crate::domain::market::{StockSnapshot, Timeframe};
use crate::domain::ml::{FeatureVector, FittedModel};
use crate::domain::performance::Stats;
use crate::domain::ports::Forecaster;
use crate::domain::prediction::{AccuracyMetrics, PredictionResult};
use chrono::Utc;
use tracing::{debug, warn};

/// Trailing observations used to measure fit quality
const LOOKBACK_OBSERVATIONS: usize = 7;
const VOLATILITY_WINDOW: usize = 20;
const RICH_HISTORY_POINTS: usize = 100;
const Z_95: f64 = 1.96;

/// Runs extract -> fit -> trajectory -> scenarios -> accuracy -> confidence
pub struct PredictionOrchestrator {
    extractor: FeatureExtractor,
    fitter: PolynomialFitter,
    generator: ScenarioGenerator,
    version: String,
}

impl Default for PredictionOrchestrator {
    fn default() -> Self {
        Self::new(PolynomialFitter::default())
    }
}

impl PredictionOrchestrator {
    pub fn new(fitter: PolynomialFitter) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            fitter,
            generator: ScenarioGenerator::new(),
            version: "1.0.0".to_string(),
        }
    }

    /// Forecaster whose reported version tracks a registry entry
    pub fn for_model(model: &ModelVersion) -> Self {
        let degree = model
            .hyperparameters
            .get("degree")
            .and_then(|v| v.as_u64())
            .map(|d| d as usize)
            .unwrap_or(super::polynomial_fitter::DEFAULT_DEGREE);

        Self {
            version: model.version.clone(),
            ..Self::new(PolynomialFitter::new(degree))
        }
    }

    pub fn predict_with(
        &self,
        snapshot: &StockSnapshot,
        timeframe: &Timeframe,
    ) -> Result<PredictionResult, PredictionError> {
        self.run(snapshot, timeframe)
            .map_err(|e| PredictionError::failed(&snapshot.symbol, e))
    }

    fn run(
        &self,
        snapshot: &StockSnapshot,
        timeframe: &Timeframe,
    ) -> Result<PredictionResult, PredictionError> {
        let features = self.extractor.extract(snapshot)?;
        let model = self.fitter.fit(&features.prices)?;
        let trajectory = self.fitter.predict(&model, timeframe.to_days());
        let scenarios = self.generator.generate(&trajectory, &features, timeframe)?;

        let base_target = trajectory
            .last()
            .copied()
            .or_else(|| features.last_price())
            .unwrap_or(0.0);
        let accuracy = self.accuracy_metrics(&features, &model, base_target);
        let confidence = Self::confidence(&features, snapshot, accuracy.r_squared);

        debug!(
            "PredictionOrchestrator[{}]: {} -> conservative {} / bullish {} / bearish {}, r2={:.3}, confidence={:.3}",
            snapshot.symbol,
            timeframe,
            scenarios.conservative.target_price,
            scenarios.bullish.target_price,
            scenarios.bearish.target_price,
            accuracy.r_squared,
            confidence
        );

        Ok(PredictionResult {
            symbol: snapshot.symbol.clone(),
            conservative: scenarios.conservative,
            bullish: scenarios.bullish,
            bearish: scenarios.bearish,
            accuracy,
            confidence,
            timestamp: Utc::now(),
        })
    }

    /// Fit quality over the trailing observations.
    ///
    /// Refits without the trailing window when enough history remains, else
    /// scores the full-history model in-sample.
    fn accuracy_metrics(
        &self,
        features: &FeatureVector,
        model: &FittedModel,
        base_target: f64,
    ) -> AccuracyMetrics {
        let n = features.prices.len();
        let window = LOOKBACK_OBSERVATIONS.min(n);
        let split = n - window;
        let held_out = &features.prices[split..];

        let scoring_model = if split > self.fitter.degree() {
            match self.fitter.fit(&features.prices[..split]) {
                Ok(m) => m,
                Err(e) => {
                    warn!(
                        "PredictionOrchestrator[{}]: hold-out fit failed ({}), scoring in-sample",
                        features.symbol, e
                    );
                    model.clone()
                }
            }
        } else {
            model.clone()
        };

        let actual: Vec<f64> = held_out.iter().map(|(_, close)| *close).collect();
        let predicted: Vec<f64> = held_out
            .iter()
            .map(|(date, _)| scoring_model.evaluate_at(*date))
            .collect();

        let rmse = Stats::rmse(&actual, &predicted);
        AccuracyMetrics {
            r_squared: Stats::r_squared(&actual, &predicted),
            rmse,
            mape: Stats::mape(&actual, &predicted),
            confidence_interval: (base_target - Z_95 * rmse, base_target + Z_95 * rmse),
        }
    }

    fn confidence(features: &FeatureVector, snapshot: &StockSnapshot, r_squared: f64) -> f64 {
        let mut confidence = 0.4 * r_squared;

        if features.prices.len() > RICH_HISTORY_POINTS {
            confidence += 0.1;
        }
        if features.pe_ratio.is_some() {
            confidence += 0.1;
        }
        if snapshot.has_political_trades() {
            confidence += 0.1;
        }
        if snapshot.has_insider_activity() {
            confidence += 0.1;
        }

        let volatility = features.return_volatility(VOLATILITY_WINDOW);
        confidence -= (2.0 * volatility).min(0.2);

        confidence.clamp(0.0, 1.0)
    }
}

impl Forecaster for PredictionOrchestrator {
    fn predict(
        &self,
        snapshot: &StockSnapshot,
        timeframe: &str,
    ) -> Result<PredictionResult, PredictionError> {
        let timeframe: Timeframe = timeframe
            .parse()
            .map_err(|e| PredictionError::failed(&snapshot.symbol, e))?;
        self.predict_with(snapshot, &timeframe)
    }

    fn name(&self) -> &str {
        POLYNOMIAL_REGRESSION
    }

    fn version(&self) -> &str {
        &self.version
    }
}
