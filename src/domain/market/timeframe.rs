use crate::domain::errors::PredictionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest accepted horizon, about ten years
pub const MAX_HORIZON_DAYS: u32 = 3650;

/// Forecast horizon such as "30d", "2w" or "3m"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timeframe {
    amount: u32,
    unit: TimeframeUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeframeUnit {
    Day,
    Week,
    Month,
}

impl TimeframeUnit {
    fn days(&self) -> u32 {
        match self {
            TimeframeUnit::Day => 1,
            TimeframeUnit::Week => 7,
            TimeframeUnit::Month => 30,
        }
    }

    fn suffix(&self) -> char {
        match self {
            TimeframeUnit::Day => 'd',
            TimeframeUnit::Week => 'w',
            TimeframeUnit::Month => 'm',
        }
    }
}

impl Timeframe {
    /// Clamped to `1..=MAX_HORIZON_DAYS`
    pub fn days(amount: u32) -> Self {
        Self {
            amount: amount.clamp(1, MAX_HORIZON_DAYS),
            unit: TimeframeUnit::Day,
        }
    }

    /// Number of calendar days this horizon spans
    pub fn to_days(&self) -> u32 {
        self.amount
            .saturating_mul(self.unit.days())
            .min(MAX_HORIZON_DAYS)
    }

    pub fn to_duration(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.to_days()))
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::days(30)
    }
}

impl FromStr for Timeframe {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        let invalid = || PredictionError::InvalidTimeframe(s.to_string());

        let unit = match trimmed.chars().last() {
            Some('d') => TimeframeUnit::Day,
            Some('w') => TimeframeUnit::Week,
            Some('m') => TimeframeUnit::Month,
            _ => return Err(invalid()),
        };

        let amount: u32 = trimmed[..trimmed.len() - 1]
            .parse()
            .map_err(|_| invalid())?;
        if amount == 0 {
            return Err(invalid());
        }
        match amount.checked_mul(unit.days()) {
            Some(days) if days <= MAX_HORIZON_DAYS => {}
            _ => return Err(invalid()),
        }

        Ok(Self { amount, unit })
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}
