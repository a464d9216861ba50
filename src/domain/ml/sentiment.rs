//! Sentiment signals feeding scenario synthesis.
//!
//! Each category is reduced to a score in [-1, 1]. Event-driven categories
//! (political, insider, options) are squashed with `tanh(raw / scale)`;
//! fundamentals use a rule-based score; technicals compare the last close to
//! its 20-observation SMA.

use super::feature_vector::FeatureVector;
use serde::{Deserialize, Serialize};
use std::fmt;
use ta::Next;
use ta::indicators::SimpleMovingAverage;

pub const POLITICAL_LOOKBACK_DAYS: i64 = 30;
pub const INSIDER_LOOKBACK_DAYS: i64 = 30;
pub const OPTIONS_LOOKBACK_DAYS: i64 = 7;
pub const TECHNICAL_LOOKBACK_OBSERVATIONS: usize = 20;

pub const POLITICAL_SCALE: f64 = 3.0;
pub const INSIDER_SCALE: f64 = 1_000_000.0;
pub const OPTIONS_SCALE: f64 = 0.5;
pub const TECHNICAL_SCALE: f64 = 0.05;

/// Squash an unbounded raw signal into [-1, 1]
pub fn normalize(raw: f64, scale: f64) -> f64 {
    if !raw.is_finite() || scale <= 0.0 {
        return 0.0;
    }
    (raw / scale).tanh()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentCategory {
    Political,
    Insider,
    Options,
    Fundamental,
    Technical,
}

impl SentimentCategory {
    pub const ALL: [SentimentCategory; 5] = [
        SentimentCategory::Political,
        SentimentCategory::Insider,
        SentimentCategory::Options,
        SentimentCategory::Fundamental,
        SentimentCategory::Technical,
    ];

    /// Minimum magnitude for the category to be cited as a scenario factor
    pub fn factor_threshold(&self) -> f64 {
        match self {
            SentimentCategory::Political
            | SentimentCategory::Insider
            | SentimentCategory::Options => 0.3,
            SentimentCategory::Fundamental | SentimentCategory::Technical => 0.2,
        }
    }

    fn describe(&self, positive: bool) -> &'static str {
        match (self, positive) {
            (SentimentCategory::Political, true) => "Net congressional buying",
            (SentimentCategory::Political, false) => "Net congressional selling",
            (SentimentCategory::Insider, true) => "Insider accumulation",
            (SentimentCategory::Insider, false) => "Insider distribution",
            (SentimentCategory::Options, true) => "Bullish options flow",
            (SentimentCategory::Options, false) => "Bearish options flow",
            (SentimentCategory::Fundamental, true) => "Supportive fundamentals",
            (SentimentCategory::Fundamental, false) => "Weak fundamentals",
            (SentimentCategory::Technical, true) => "Price above 20-day average",
            (SentimentCategory::Technical, false) => "Price below 20-day average",
        }
    }
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentCategory::Political => write!(f, "political"),
            SentimentCategory::Insider => write!(f, "insider"),
            SentimentCategory::Options => write!(f, "options"),
            SentimentCategory::Fundamental => write!(f, "fundamental"),
            SentimentCategory::Technical => write!(f, "technical"),
        }
    }
}

/// The five per-category scores used by the scenario generator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentSignals {
    pub political: f64,
    pub insider: f64,
    pub options: f64,
    pub fundamental: f64,
    pub technical: f64,
}

impl SentimentSignals {
    pub fn from_features(features: &FeatureVector) -> Self {
        Self {
            political: features.political_sentiment.clamp(-1.0, 1.0),
            insider: features.insider_sentiment.clamp(-1.0, 1.0),
            options: features.options_sentiment.clamp(-1.0, 1.0),
            fundamental: fundamental_score(features),
            technical: technical_score(&features.closes()),
        }
    }

    pub fn get(&self, category: SentimentCategory) -> f64 {
        match category {
            SentimentCategory::Political => self.political,
            SentimentCategory::Insider => self.insider,
            SentimentCategory::Options => self.options,
            SentimentCategory::Fundamental => self.fundamental,
            SentimentCategory::Technical => self.technical,
        }
    }

    pub fn mean(&self) -> f64 {
        SentimentCategory::ALL.iter().map(|c| self.get(*c)).sum::<f64>()
            / SentimentCategory::ALL.len() as f64
    }

    pub fn positive_count(&self) -> usize {
        SentimentCategory::ALL
            .iter()
            .filter(|c| self.get(**c) > 0.0)
            .count()
    }

    pub fn negative_count(&self) -> usize {
        SentimentCategory::ALL
            .iter()
            .filter(|c| self.get(**c) < 0.0)
            .count()
    }

    /// Human-readable factors for every category past its threshold
    pub fn notable_factors(&self) -> Vec<String> {
        SentimentCategory::ALL
            .iter()
            .filter_map(|category| {
                let value = self.get(*category);
                if value.abs() > category.factor_threshold() {
                    Some(format!("{} ({:+.2})", category.describe(value > 0.0), value))
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Rule-based valuation/growth/profitability score, clipped to [-1, 1]
pub fn fundamental_score(features: &FeatureVector) -> f64 {
    let mut score = 0.0;

    if let Some(pe) = features.pe_ratio.filter(|pe| pe.is_finite() && *pe > 0.0) {
        if pe < 15.0 {
            score += 0.3;
        } else if pe > 30.0 {
            score -= 0.3;
        }
    }

    if let Some(growth) = features.revenue_growth.filter(|g| g.is_finite()) {
        if growth > 0.10 {
            score += 0.3;
        } else if growth < 0.0 {
            score -= 0.3;
        }
    }

    if let Some(eps) = features.eps.filter(|e| e.is_finite()) {
        if eps > 0.0 {
            score += 0.2;
        } else if eps < 0.0 {
            score -= 0.2;
        }
    }

    f64::clamp(score, -1.0, 1.0)
}

/// Distance of the last close from its SMA over the trailing window
pub fn technical_score(closes: &[f64]) -> f64 {
    let start = closes.len().saturating_sub(TECHNICAL_LOOKBACK_OBSERVATIONS);
    let window = &closes[start..];
    let Some(&last) = window.last() else {
        return 0.0;
    };

    let Ok(mut sma) = SimpleMovingAverage::new(window.len()) else {
        return 0.0;
    };
    let mut average = last;
    for &close in window {
        average = sma.next(close);
    }

    if average <= 0.0 {
        return 0.0;
    }
    normalize((last - average) / average, TECHNICAL_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::feature_vector::sample_vector;

    #[test]
    fn test_normalize_bounds() {
        assert_eq!(normalize(0.0, 3.0), 0.0);
        assert!(normalize(1e9, 3.0) <= 1.0);
        assert!(normalize(-1e9, 3.0) >= -1.0);
        assert_eq!(normalize(f64::NAN, 3.0), 0.0);
        assert_eq!(normalize(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_fundamental_score_rules() {
        let mut fv = sample_vector(&[100.0]);
        fv.pe_ratio = Some(10.0);
        fv.revenue_growth = Some(0.25);
        fv.eps = Some(3.0);
        assert!((fundamental_score(&fv) - 0.8).abs() < 1e-12);

        fv.pe_ratio = Some(45.0);
        fv.revenue_growth = Some(-0.05);
        fv.eps = Some(-1.0);
        assert!((fundamental_score(&fv) + 0.8).abs() < 1e-12);

        fv.pe_ratio = Some(-3.0);
        fv.revenue_growth = None;
        fv.eps = None;
        assert_eq!(fundamental_score(&fv), 0.0);
    }

    #[test]
    fn test_technical_score_sign() {
        let rising: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        assert!(technical_score(&rising) > 0.0);

        let falling: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        assert!(technical_score(&falling) < 0.0);

        assert_eq!(technical_score(&[]), 0.0);
        assert_eq!(technical_score(&[42.0; 25]), 0.0);
    }

    #[test]
    fn test_counts_and_factors() {
        let signals = SentimentSignals {
            political: 0.5,
            insider: -0.4,
            options: 0.1,
            fundamental: 0.25,
            technical: -0.1,
        };
        assert_eq!(signals.positive_count(), 3);
        assert_eq!(signals.negative_count(), 2);
        assert!((signals.mean() - 0.07).abs() < 1e-12);

        let factors = signals.notable_factors();
        assert_eq!(factors.len(), 3);
        assert!(factors[0].contains("congressional buying"));
        assert!(factors[1].contains("Insider distribution"));
        assert!(factors[2].contains("fundamentals"));
    }
}
