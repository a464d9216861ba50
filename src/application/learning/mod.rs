pub mod continuous_learning;
pub mod model_registry;
pub mod performance_logger;

pub use continuous_learning::ContinuousLearningController;
pub use model_registry::ModelRegistry;
pub use performance_logger::{PerformanceLogger, SweepSummary};
