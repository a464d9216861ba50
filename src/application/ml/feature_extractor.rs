use crate::domain::errors::PredictionError;
use crate::domain::market::{OptionType, StockSnapshot};
use crate::domain::ml::FeatureVector;
use crate::domain::ml::sentiment::{
    INSIDER_LOOKBACK_DAYS, INSIDER_SCALE, OPTIONS_LOOKBACK_DAYS, OPTIONS_SCALE,
    POLITICAL_LOOKBACK_DAYS, POLITICAL_SCALE, normalize,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Turns a stock snapshot into the numeric inputs of one prediction.
///
/// Lookback windows are anchored on the most recent observed price date so
/// the same snapshot always yields the same features.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, snapshot: &StockSnapshot) -> Result<FeatureVector, PredictionError> {
        let mut bars = snapshot.market_data.prices.clone();
        if bars.is_empty() {
            return Err(PredictionError::InsufficientData {
                required: 1,
                available: 0,
            });
        }
        bars.sort_by_key(|bar| bar.date);

        let volume_by_date: HashMap<DateTime<Utc>, f64> = snapshot
            .market_data
            .volume
            .iter()
            .map(|v| (v.date, v.volume))
            .collect();

        let prices: Vec<(DateTime<Utc>, f64)> = bars.iter().map(|b| (b.date, b.close)).collect();
        let volumes: Vec<f64> = bars
            .iter()
            .map(|b| volume_by_date.get(&b.date).copied().unwrap_or(0.0))
            .collect();

        // Non-empty, checked above
        let anchor = bars[bars.len() - 1].date;

        let fundamentals = snapshot.fundamentals.clone().unwrap_or_default();
        let features = FeatureVector {
            symbol: snapshot.symbol.clone(),
            prices,
            volumes,
            pe_ratio: fundamentals.valid_pe_ratio(),
            market_cap: fundamentals.market_cap,
            revenue_growth: fundamentals.revenue_growth,
            eps: fundamentals.eps,
            political_sentiment: Self::political_sentiment(snapshot, anchor),
            insider_sentiment: Self::insider_sentiment(snapshot, anchor),
            options_sentiment: Self::options_sentiment(snapshot, anchor),
        };

        debug!(
            "FeatureExtractor[{}]: {} prices, sentiment political={:.2} insider={:.2} options={:.2}",
            features.symbol,
            features.prices.len(),
            features.political_sentiment,
            features.insider_sentiment,
            features.options_sentiment
        );

        Ok(features)
    }

    /// Net buys minus sells by officials over the lookback window
    fn political_sentiment(snapshot: &StockSnapshot, anchor: DateTime<Utc>) -> f64 {
        let cutoff = anchor - Duration::days(POLITICAL_LOOKBACK_DAYS);
        let net: f64 = snapshot
            .political_trades
            .iter()
            .flatten()
            .filter(|t| t.date >= cutoff)
            .map(|t| t.transaction_type.sign())
            .sum();
        normalize(net, POLITICAL_SCALE)
    }

    /// Net signed insider notional over the lookback window
    fn insider_sentiment(snapshot: &StockSnapshot, anchor: DateTime<Utc>) -> f64 {
        let cutoff = anchor - Duration::days(INSIDER_LOOKBACK_DAYS);
        let net: f64 = snapshot
            .insider_activity
            .iter()
            .flatten()
            .filter(|t| t.date >= cutoff)
            .map(|t| t.signed_value())
            .sum();
        normalize(net, INSIDER_SCALE)
    }

    /// Call/put volume imbalance over the lookback window
    fn options_sentiment(snapshot: &StockSnapshot, anchor: DateTime<Utc>) -> f64 {
        let cutoff = anchor - Duration::days(OPTIONS_LOOKBACK_DAYS);
        let (calls, puts) = snapshot
            .options_flow
            .iter()
            .flatten()
            .filter(|o| o.date >= cutoff && o.volume > 0.0)
            .fold((0.0, 0.0), |(calls, puts), o| match o.option_type {
                OptionType::Call => (calls + o.volume, puts),
                OptionType::Put => (calls, puts + o.volume),
            });

        let total = calls + puts;
        if total <= 0.0 {
            return 0.0;
        }
        normalize((calls - puts) / total, OPTIONS_SCALE)
    }
}
