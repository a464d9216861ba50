//! Configuration module for Stockcast.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by domain: Prediction, Learning, and Observability.

mod learning_config;
mod observability_config;
mod prediction_config;

pub use learning_config::LearningEnvConfig;
pub use observability_config::ObservabilityEnvConfig;
pub use prediction_config::{MAX_POLYNOMIAL_DEGREE, PredictionEnvConfig};

use crate::domain::learning::{ABTestConfig, RetrainingConfig};
use crate::domain::market::Timeframe;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration.
///
/// Aggregates all sub-configs into the flat view the rest of the application reads.
#[derive(Debug, Clone)]
pub struct Config {
    // Prediction (from PredictionEnvConfig)
    pub timeframe: Timeframe,
    pub polynomial_degree: usize,
    pub outcome_sweep_interval_secs: u64,
    pub outcome_retention_days: i64,
    pub snapshot_dir: PathBuf,

    // Learning (from LearningEnvConfig)
    pub retraining: RetrainingConfig,
    pub ab_test: ABTestConfig,
    /// Seed for reproducible traffic splitting; thread RNG when unset
    pub ab_test_seed: Option<u64>,

    // Observability (from ObservabilityEnvConfig)
    pub observability_enabled: bool,
    pub observability_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::compose(
            PredictionEnvConfig::default(),
            LearningEnvConfig::default(),
            ObservabilityEnvConfig::default(),
        )
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This orchestrates loading from all sub-config modules and composes
    /// them into a unified Config struct.
    pub fn from_env() -> Result<Self> {
        let prediction =
            PredictionEnvConfig::from_env().context("Failed to load prediction config")?;
        let learning = LearningEnvConfig::from_env().context("Failed to load learning config")?;
        let observability =
            ObservabilityEnvConfig::from_env().context("Failed to load observability config")?;

        Ok(Self::compose(prediction, learning, observability))
    }

    fn compose(
        prediction: PredictionEnvConfig,
        learning: LearningEnvConfig,
        observability: ObservabilityEnvConfig,
    ) -> Self {
        Self {
            timeframe: prediction.timeframe,
            polynomial_degree: prediction.polynomial_degree,
            outcome_sweep_interval_secs: prediction.outcome_sweep_interval_secs,
            outcome_retention_days: prediction.outcome_retention_days,
            snapshot_dir: prediction.snapshot_dir,

            retraining: learning.retraining,
            ab_test: learning.ab_test,
            ab_test_seed: learning.ab_test_seed,

            observability_enabled: observability.enabled,
            observability_interval_secs: observability.interval_seconds,
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.outcome_sweep_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.timeframe.to_string(), "30d");
        assert_eq!(config.polynomial_degree, 2);
        assert_eq!(config.sweep_interval(), Duration::from_secs(3600));
        assert!(config.retraining.enabled);
        assert!((config.ab_test.traffic_split_percent - 50.0).abs() < f64::EPSILON);
        assert_eq!(config.observability_interval_secs, 60);
        assert!(config.ab_test_seed.is_none());
    }
}
