use crate::domain::errors::PredictionError;
use crate::domain::market::StockSnapshot;
use crate::domain::prediction::PredictionResult;
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Latest-price lookup used to resolve matured predictions
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// `Ok(None)` when the source has no quote for the symbol
    async fn latest_price(&self, symbol: &str) -> Result<Option<Decimal>>;
}

/// Uniform draws for traffic splitting; injectable so tests can force routing
pub trait RandomSource: Send + Sync {
    /// Uniform value in [0, 100)
    fn next_percent(&self) -> f64;
}

/// Interface for price forecasting models
pub trait Forecaster: Send + Sync {
    /// Forecast `timeframe` ahead (e.g. "30d") from a snapshot
    fn predict(
        &self,
        snapshot: &StockSnapshot,
        timeframe: &str,
    ) -> Result<PredictionResult, PredictionError>;

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version
    fn version(&self) -> &str;
}
