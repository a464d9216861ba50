use thiserror::Error;

/// Errors raised while turning a stock snapshot into a forecast
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Insufficient data: need at least {required} samples, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Model fit failed: {reason}")]
    ModelFit { reason: String },

    #[error("Invalid timeframe '{0}': expected a horizon such as '30d', '2w' or '3m'")]
    InvalidTimeframe(String),

    #[error("Prediction failed for {symbol}: {source}")]
    PredictionFailed {
        symbol: String,
        #[source]
        source: Box<PredictionError>,
    },
}

impl PredictionError {
    /// Wrap a lower-level failure with the symbol it happened for.
    pub fn failed(symbol: impl Into<String>, cause: PredictionError) -> Self {
        PredictionError::PredictionFailed {
            symbol: symbol.into(),
            source: Box::new(cause),
        }
    }

    /// Innermost error, skipping any `PredictionFailed` wrappers.
    pub fn root_cause(&self) -> &PredictionError {
        match self {
            PredictionError::PredictionFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// True when the caller supplied data the model cannot work with.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self.root_cause(),
            PredictionError::InsufficientData { .. }
                | PredictionError::ModelFit { .. }
                | PredictionError::InvalidTimeframe(_)
        )
    }
}

/// Errors related to resolving issued predictions against observed prices
#[derive(Debug, Error)]
pub enum OutcomeError {
    #[error("No current price available for {symbol}: {reason}")]
    PriceUnavailable { symbol: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_insufficient_data_formatting() {
        let error = PredictionError::InsufficientData {
            required: 3,
            available: 1,
        };

        let msg = error.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('1'));
    }

    #[test]
    fn test_prediction_failed_keeps_root_cause() {
        let error = PredictionError::failed(
            "AAPL",
            PredictionError::ModelFit {
                reason: "singular matrix".to_string(),
            },
        );

        assert!(error.to_string().contains("AAPL"));
        assert!(error.source().is_some());
        assert!(matches!(
            error.root_cause(),
            PredictionError::ModelFit { .. }
        ));
        assert!(error.is_data_error());
    }

    #[test]
    fn test_outcome_error_formatting() {
        let error = OutcomeError::PriceUnavailable {
            symbol: "TSLA".to_string(),
            reason: "timeout".to_string(),
        };
        assert!(error.to_string().contains("TSLA"));
    }
}
