use crate::domain::ports::PriceProvider;
use anyhow::{Result, bail};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory quotes with settable prices and injectable failures
#[derive(Clone, Default)]
pub struct MockPriceProvider {
    prices: Arc<RwLock<HashMap<String, Decimal>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<HashMap<String, usize>>>,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockPriceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_price(&self, symbol: &str, price: Decimal) {
        self.failing.write().await.remove(symbol);
        self.prices.write().await.insert(symbol.to_string(), price);
    }

    /// Lookups for `symbol` return an error until a price is set again
    pub async fn fail_symbol(&self, symbol: &str) {
        self.failing.write().await.insert(symbol.to_string());
    }

    pub async fn clear_price(&self, symbol: &str) {
        self.prices.write().await.remove(symbol);
    }

    /// Every lookup sleeps this long before answering
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().await = delay;
    }

    /// Number of lookups made for `symbol`
    pub async fn call_count(&self, symbol: &str) -> usize {
        self.calls.read().await.get(symbol).copied().unwrap_or(0)
    }
}

#[async_trait]
impl PriceProvider for MockPriceProvider {
    async fn latest_price(&self, symbol: &str) -> Result<Option<Decimal>> {
        *self
            .calls
            .write()
            .await
            .entry(symbol.to_string())
            .or_insert(0) += 1;

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.read().await.contains(symbol) {
            debug!("MockPriceProvider: simulated failure for {}", symbol);
            bail!("simulated quote failure for {}", symbol);
        }
        Ok(self.prices.read().await.get(symbol).copied())
    }
}
