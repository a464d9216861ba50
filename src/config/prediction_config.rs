//! Prediction configuration parsing from environment variables.
//!
//! This module handles the forecast horizon, polynomial degree and outcome sweep settings.

use crate::domain::market::Timeframe;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Highest polynomial degree accepted from configuration
pub const MAX_POLYNOMIAL_DEGREE: usize = 6;

/// Prediction environment configuration
#[derive(Debug, Clone)]
pub struct PredictionEnvConfig {
    pub timeframe: Timeframe,
    pub polynomial_degree: usize,
    pub outcome_sweep_interval_secs: u64,
    pub outcome_retention_days: i64,
    pub snapshot_dir: PathBuf,
}

impl Default for PredictionEnvConfig {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::default(),
            polynomial_degree: 2,
            outcome_sweep_interval_secs: 3600,
            outcome_retention_days: 90,
            snapshot_dir: PathBuf::from("data/snapshots"),
        }
    }
}

impl PredictionEnvConfig {
    pub fn from_env() -> Result<Self> {
        let timeframe = env::var("PREDICTION_TIMEFRAME")
            .unwrap_or_else(|_| "30d".to_string())
            .parse::<Timeframe>()
            .context("Failed to parse PREDICTION_TIMEFRAME")?;

        let polynomial_degree = Self::parse_usize("POLYNOMIAL_DEGREE", 2)?;
        if polynomial_degree == 0 || polynomial_degree > MAX_POLYNOMIAL_DEGREE {
            anyhow::bail!(
                "POLYNOMIAL_DEGREE must be between 1 and {}, got {}",
                MAX_POLYNOMIAL_DEGREE,
                polynomial_degree
            );
        }

        let outcome_sweep_interval_secs = env::var("OUTCOME_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<u64>()
            .context("Failed to parse OUTCOME_SWEEP_INTERVAL_SECS")?;
        if outcome_sweep_interval_secs == 0 {
            anyhow::bail!("OUTCOME_SWEEP_INTERVAL_SECS must be positive");
        }

        let outcome_retention_days = env::var("OUTCOME_RETENTION_DAYS")
            .unwrap_or_else(|_| "90".to_string())
            .parse::<i64>()
            .context("Failed to parse OUTCOME_RETENTION_DAYS")?;
        if outcome_retention_days <= 0 {
            anyhow::bail!("OUTCOME_RETENTION_DAYS must be positive");
        }

        Ok(Self {
            timeframe,
            polynomial_degree,
            outcome_sweep_interval_secs,
            outcome_retention_days,
            snapshot_dir: env::var("SNAPSHOT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/snapshots")),
        })
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_config_defaults() {
        let config = PredictionEnvConfig::default();
        assert_eq!(config.timeframe.to_days(), 30);
        assert_eq!(config.polynomial_degree, 2);
        assert_eq!(config.outcome_sweep_interval_secs, 3600);
        assert_eq!(config.outcome_retention_days, 90);
        assert_eq!(config.snapshot_dir, PathBuf::from("data/snapshots"));
    }
}
