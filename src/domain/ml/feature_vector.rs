use chrono::{DateTime, Utc};
use statrs::statistics::{Data, Distribution};

/// Numeric inputs for one prediction call.
///
/// Built fresh by the feature extractor and owned by that call only.
/// The three sentiment scalars are already normalized into [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub symbol: String,
    /// (date, close) pairs in chronological order
    pub prices: Vec<(DateTime<Utc>, f64)>,
    /// Volumes aligned with `prices`; zero where no volume was reported
    pub volumes: Vec<f64>,
    pub pe_ratio: Option<f64>,
    pub market_cap: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub eps: Option<f64>,
    pub political_sentiment: f64,
    pub insider_sentiment: f64,
    pub options_sentiment: f64,
}

impl FeatureVector {
    pub fn last_price(&self) -> Option<f64> {
        self.prices.last().map(|(_, close)| *close)
    }

    pub fn last_date(&self) -> Option<DateTime<Utc>> {
        self.prices.last().map(|(date, _)| *date)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.prices.iter().map(|(_, close)| *close).collect()
    }

    /// Simple returns over the trailing `window` observations.
    pub fn trailing_returns(&self, window: usize) -> Vec<f64> {
        let closes = self.closes();
        let start = closes.len().saturating_sub(window + 1);
        closes[start..]
            .windows(2)
            .filter(|w| w[0] > 0.0)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect()
    }

    /// Sample standard deviation of the trailing daily returns, 0 when undefined.
    pub fn return_volatility(&self, window: usize) -> f64 {
        let returns = self.trailing_returns(window);
        if returns.len() < 2 {
            return 0.0;
        }
        Data::new(returns)
            .std_dev()
            .filter(|s| s.is_finite())
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
pub(crate) fn sample_vector(closes: &[f64]) -> FeatureVector {
    let start = chrono::TimeZone::with_ymd_and_hms(&Utc, 2024, 1, 1, 0, 0, 0).unwrap();
    FeatureVector {
        symbol: "TEST".to_string(),
        prices: closes
            .iter()
            .enumerate()
            .map(|(i, c)| (start + chrono::Duration::days(i as i64), *c))
            .collect(),
        volumes: vec![0.0; closes.len()],
        pe_ratio: None,
        market_cap: None,
        revenue_growth: None,
        eps: None,
        political_sentiment: 0.0,
        insider_sentiment: 0.0,
        options_sentiment: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_returns_window() {
        let fv = sample_vector(&[100.0, 110.0, 99.0, 99.0]);
        let returns = fv.trailing_returns(2);
        assert_eq!(returns.len(), 2);
        assert!((returns[0] + 0.1).abs() < 1e-12);
        assert!(returns[1].abs() < 1e-12);
    }

    #[test]
    fn test_volatility_flat_series_is_zero() {
        let fv = sample_vector(&[50.0; 30]);
        assert_eq!(fv.return_volatility(20), 0.0);
    }

    #[test]
    fn test_volatility_needs_two_returns() {
        let fv = sample_vector(&[50.0, 51.0]);
        assert_eq!(fv.return_volatility(20), 0.0);

        let fv = sample_vector(&[50.0, 55.0, 50.0, 55.0]);
        assert!(fv.return_volatility(20) > 0.0);
    }
}
