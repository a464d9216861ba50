pub mod model_performance;
pub mod performance_evaluator;
pub mod stats;

pub use model_performance::{ModelPerformance, RegistryStats};
pub use performance_evaluator::PerformanceEvaluator;
pub use stats::Stats;
