pub mod model_version;
pub mod outcome;
pub mod retraining;

pub use ab_test::{
    ABTest, ABTestConfig, ABTestEvaluation, ABTestResult, ABTestStatus, Variant, VariantMetrics,
};
pub use model_version::{ModelAccuracy, ModelVersion, POLYNOMIAL_REGRESSION};
pub use outcome::{PendingPrediction, PendingStatus, PredictionOutcome, prediction_accuracy};
pub use retraining::{RetrainingConfig, RetrainingEvent, TriggerReason};
