pub mod feature_extractor;
pub mod polynomial_fitter;
pub mod predictor;
pub mod scenario_generator;

pub use feature_extractor::FeatureExtractor;
pub use polynomial_fitter::PolynomialFitter;
pub use predictor::PredictionOrchestrator;
pub use scenario_generator::ScenarioGenerator;
