// Stock snapshot inputs and forecast horizons
pub mod market;

// Feature vectors, fitted polynomials and sentiment signals
pub mod ml;

// Forecast outputs
pub mod prediction;

// Model versions, outcomes, retraining and A/B tests
pub mod learning;

// Live performance aggregation
pub mod performance;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
