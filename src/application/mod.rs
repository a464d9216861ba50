// Forecasting pipeline: features, polynomial fit, scenarios
pub mod ml;

// Model registry, outcome tracking and A/B testing
pub mod learning;

// Service wiring and lifecycle
pub mod system;
