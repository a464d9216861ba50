pub mod feature_vector;
pub mod polynomial;
pub mod sentiment;

pub use feature_vector::FeatureVector;
pub use polynomial::{FittedModel, day_offset};
pub use sentiment::{SentimentCategory, SentimentSignals};
