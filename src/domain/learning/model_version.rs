use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Model type served by the prediction orchestrator
pub const POLYNOMIAL_REGRESSION: &str = "Polynomial Regression";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelAccuracy {
    pub r_squared: f64,
    pub rmse: f64,
    pub mape: f64,
}

/// Registered model metadata.
///
/// Only `is_active` ever changes after registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelVersion {
    pub id: String,
    pub version: String,
    pub model_type: String,
    pub accuracy: ModelAccuracy,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub training_data_size: usize,
    pub hyperparameters: BTreeMap<String, serde_json::Value>,
}

impl ModelVersion {
    /// Baseline polynomial model every fresh registry starts with
    pub fn initial_polynomial(degree: usize) -> Self {
        let version = "1.0.0".to_string();
        let mut hyperparameters = BTreeMap::new();
        hyperparameters.insert("degree".to_string(), serde_json::json!(degree));
        hyperparameters.insert("accuracyLookbackDays".to_string(), serde_json::json!(7));

        Self {
            id: Self::model_id(POLYNOMIAL_REGRESSION, &version),
            version,
            model_type: POLYNOMIAL_REGRESSION.to_string(),
            accuracy: ModelAccuracy {
                r_squared: 0.75,
                rmse: 2.5,
                mape: 3.2,
            },
            created_at: Utc::now(),
            is_active: true,
            training_data_size: 1000,
            hyperparameters,
        }
    }

    /// Stable id derived from type and version, e.g. `polynomial-regression-v1.0.1`
    pub fn model_id(model_type: &str, version: &str) -> String {
        let slug = model_type
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .map(|part| part.to_lowercase())
            .collect::<Vec<_>>()
            .join("-");
        format!("{}-v{}", slug, version)
    }

    /// Successor produced by the retraining trigger: next patch version,
    /// inactive, with accuracy nudged toward improvement.
    pub fn retrained(&self) -> Self {
        let version = bump_patch(&self.version);
        Self {
            id: Self::model_id(&self.model_type, &version),
            version,
            model_type: self.model_type.clone(),
            accuracy: ModelAccuracy {
                r_squared: (self.accuracy.r_squared + 0.05).min(0.95),
                rmse: self.accuracy.rmse * 0.95,
                mape: self.accuracy.mape * 0.95,
            },
            created_at: Utc::now(),
            is_active: false,
            training_data_size: self.training_data_size + 100,
            hyperparameters: self.hyperparameters.clone(),
        }
    }
}

/// Increment the last numeric component of a dotted version string
pub fn bump_patch(version: &str) -> String {
    let mut parts: Vec<String> = version.split('.').map(str::to_string).collect();
    match parts.last().and_then(|p| p.parse::<u64>().ok()) {
        Some(patch) => {
            if let Some(last) = parts.last_mut() {
                *last = (patch + 1).to_string();
            }
            parts.join(".")
        }
        None => format!("{}.1", version),
    }
}
