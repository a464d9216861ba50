//! Continuous-learning configuration parsing from environment variables.
//!
//! This module handles retraining thresholds and A/B test settings.

use crate::domain::learning::{ABTestConfig, RetrainingConfig};
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Learning environment configuration
#[derive(Debug, Clone, Default)]
pub struct LearningEnvConfig {
    pub retraining: RetrainingConfig,
    pub ab_test: ABTestConfig,
    pub ab_test_seed: Option<u64>,
}

impl LearningEnvConfig {
    pub fn from_env() -> Result<Self> {
        let retraining = RetrainingConfig {
            enabled: Self::parse("RETRAINING_ENABLED", true)?,
            accuracy_threshold: Self::parse("RETRAINING_ACCURACY_THRESHOLD", 0.6)?,
            min_predictions: Self::parse("RETRAINING_MIN_PREDICTIONS", 10)?,
            evaluation_period_days: Self::parse("RETRAINING_EVALUATION_PERIOD_DAYS", 30)?,
        };

        let ab_test = ABTestConfig {
            enabled: Self::parse("AB_TEST_ENABLED", true)?,
            traffic_split_percent: Self::parse("AB_TEST_TRAFFIC_SPLIT_PERCENT", 50.0)?,
            min_sample_size: Self::parse("AB_TEST_MIN_SAMPLE_SIZE", 100)?,
            significance_level: Self::parse("AB_TEST_SIGNIFICANCE_LEVEL", 0.05)?,
            test_duration_days: Self::parse("AB_TEST_DURATION_DAYS", 14)?,
        };

        let ab_test_seed = match env::var("AB_TEST_SEED") {
            Ok(raw) => Some(
                raw.parse::<u64>()
                    .context("Failed to parse AB_TEST_SEED")?,
            ),
            Err(_) => None,
        };

        let config = Self {
            retraining,
            ab_test,
            ab_test_seed,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the runtime setters would otherwise have to clamp
    pub fn validate(&self) -> Result<()> {
        let threshold = self.retraining.accuracy_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!(
                "RETRAINING_ACCURACY_THRESHOLD must be within [0, 1], got {}",
                threshold
            );
        }
        if self.retraining.evaluation_period_days == 0 {
            anyhow::bail!("RETRAINING_EVALUATION_PERIOD_DAYS must be positive");
        }

        let split = self.ab_test.traffic_split_percent;
        if !(0.0..=100.0).contains(&split) {
            anyhow::bail!(
                "AB_TEST_TRAFFIC_SPLIT_PERCENT must be within [0, 100], got {}",
                split
            );
        }
        let significance = self.ab_test.significance_level;
        if !(0.0..=1.0).contains(&significance) {
            anyhow::bail!(
                "AB_TEST_SIGNIFICANCE_LEVEL must be within [0, 1], got {}",
                significance
            );
        }
        if self.ab_test.test_duration_days == 0 {
            anyhow::bail!("AB_TEST_DURATION_DAYS must be positive");
        }
        Ok(())
    }

    fn parse<T>(key: &str, default: T) -> Result<T>
    where
        T: FromStr + ToString,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<T>()
            .context(format!("Failed to parse {}", key))
    }
}
