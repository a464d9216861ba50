use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything known about one stock at prediction time.
///
/// Produced by the data collaborators (quote, fundamentals and disclosure
/// clients); the optional sentiment sources are treated as zero-signal when
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshot {
    pub symbol: String,
    pub market_data: MarketData,
    #[serde(default)]
    pub fundamentals: Option<Fundamentals>,
    #[serde(default)]
    pub political_trades: Option<Vec<PoliticalTrade>>,
    #[serde(default)]
    pub insider_activity: Option<Vec<InsiderTransaction>>,
    #[serde(default)]
    pub options_flow: Option<Vec<OptionsFlowEntry>>,
}

impl StockSnapshot {
    pub fn new(symbol: &str, market_data: MarketData) -> Self {
        Self {
            symbol: symbol.to_string(),
            market_data,
            fundamentals: None,
            political_trades: None,
            insider_activity: None,
            options_flow: None,
        }
    }

    /// Close of the latest-dated bar, if any price history is present
    pub fn last_close(&self) -> Option<f64> {
        self.market_data
            .prices
            .iter()
            .max_by_key(|p| p.date)
            .map(|p| p.close)
    }

    pub fn has_political_trades(&self) -> bool {
        self.political_trades.as_ref().is_some_and(|t| !t.is_empty())
    }

    pub fn has_insider_activity(&self) -> bool {
        self.insider_activity.as_ref().is_some_and(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub prices: Vec<PriceBar>,
    #[serde(default)]
    pub volume: Vec<VolumeBar>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBar {
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeBar {
    pub date: DateTime<Utc>,
    pub volume: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundamentals {
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default, alias = "forwardPE")]
    pub forward_pe: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub eps: Option<f64>,
    #[serde(default)]
    pub revenue: Option<f64>,
    /// Fractional year-over-year growth (0.12 = 12%)
    #[serde(default)]
    pub revenue_growth: Option<f64>,
}

impl Fundamentals {
    /// P/E is only meaningful when positive and finite
    pub fn valid_pe_ratio(&self) -> Option<f64> {
        self.pe_ratio.filter(|pe| pe.is_finite() && *pe > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    #[serde(alias = "purchase", alias = "Buy", alias = "BUY")]
    Buy,
    #[serde(alias = "sale", alias = "Sell", alias = "SELL")]
    Sell,
}

impl TradeDirection {
    pub fn sign(&self) -> f64 {
        match self {
            TradeDirection::Buy => 1.0,
            TradeDirection::Sell => -1.0,
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDirection::Buy => write!(f, "BUY"),
            TradeDirection::Sell => write!(f, "SELL"),
        }
    }
}

/// Disclosed trade by a member of congress or other public official
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoliticalTrade {
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub politician: String,
    pub transaction_type: TradeDirection,
    #[serde(default)]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsiderTransaction {
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub insider: String,
    pub transaction_type: TradeDirection,
    pub shares: f64,
    #[serde(default)]
    pub price: Option<f64>,
}

impl InsiderTransaction {
    /// Signed notional; falls back to share count when no price was disclosed
    pub fn signed_value(&self) -> f64 {
        let notional = match self.price {
            Some(price) if price > 0.0 => self.shares * price,
            _ => self.shares,
        };
        self.transaction_type.sign() * notional.abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    #[serde(alias = "Call", alias = "CALL")]
    Call,
    #[serde(alias = "Put", alias = "PUT")]
    Put,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsFlowEntry {
    pub date: DateTime<Utc>,
    pub option_type: OptionType,
    pub volume: f64,
    #[serde(default)]
    pub premium: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_deserializes_camel_case() {
        let json = r#"{
            "symbol": "NVDA",
            "marketData": {
                "prices": [
                    {"date": "2024-03-01T00:00:00Z", "open": 1.0, "high": 2.0, "low": 0.5,
                     "close": 1.5, "adjustedClose": 1.5}
                ],
                "volume": [{"date": "2024-03-01T00:00:00Z", "volume": 1000.0}]
            },
            "fundamentals": {"peRatio": 65.2, "revenueGrowth": 1.2},
            "politicalTrades": [
                {"date": "2024-02-20T00:00:00Z", "politician": "X", "transactionType": "purchase"}
            ]
        }"#;

        let snapshot: StockSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.symbol, "NVDA");
        assert_eq!(snapshot.last_close(), Some(1.5));
        assert!(snapshot.has_political_trades());
        assert!(!snapshot.has_insider_activity());
        assert!(snapshot.options_flow.is_none());

        let fundamentals = snapshot.fundamentals.unwrap();
        assert_eq!(fundamentals.valid_pe_ratio(), Some(65.2));
        assert!(fundamentals.eps.is_none());
    }

    #[test]
    fn test_negative_pe_is_invalid() {
        let fundamentals = Fundamentals {
            pe_ratio: Some(-4.0),
            ..Default::default()
        };
        assert!(fundamentals.valid_pe_ratio().is_none());
    }

    #[test]
    fn test_insider_signed_value() {
        let sale = InsiderTransaction {
            date: Utc::now(),
            insider: "CFO".to_string(),
            transaction_type: TradeDirection::Sell,
            shares: 1000.0,
            price: Some(50.0),
        };
        assert_eq!(sale.signed_value(), -50_000.0);

        let grant = InsiderTransaction {
            price: None,
            transaction_type: TradeDirection::Buy,
            ..sale
        };
        assert_eq!(grant.signed_value(), 1000.0);
    }
}
