use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Fractional days elapsed between two instants
pub fn day_offset(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / SECONDS_PER_DAY
}

/// Least-squares polynomial over day offsets from `first_date`.
///
/// Immutable once fit. `coefficients[j]` multiplies `x^j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub degree: usize,
    pub coefficients: Vec<f64>,
    pub first_date: DateTime<Utc>,
    pub last_date: DateTime<Utc>,
}

impl FittedModel {
    /// Horner evaluation at a day offset from `first_date`
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * x + c)
    }

    pub fn evaluate_at(&self, date: DateTime<Utc>) -> f64 {
        self.evaluate(day_offset(self.first_date, date))
    }

    /// Day offset of the last observed sample
    pub fn last_offset(&self) -> f64 {
        day_offset(self.first_date, self.last_date)
    }

    /// Values for each of the next `days` calendar days after the last sample
    pub fn forecast(&self, days: u32) -> Vec<f64> {
        let anchor = self.last_offset();
        (1..=days)
            .map(|k| self.evaluate(anchor + f64::from(k)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn model(coefficients: Vec<f64>) -> FittedModel {
        let first = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        FittedModel {
            degree: coefficients.len() - 1,
            coefficients,
            first_date: first,
            last_date: first + chrono::Duration::days(2),
        }
    }

    #[test]
    fn test_horner_evaluation() {
        // 1 + 2x + 3x^2
        let m = model(vec![1.0, 2.0, 3.0]);
        assert_eq!(m.evaluate(0.0), 1.0);
        assert_eq!(m.evaluate(1.0), 6.0);
        assert_eq!(m.evaluate(2.0), 17.0);
    }

    #[test]
    fn test_forecast_starts_after_last_sample() {
        let m = model(vec![10.0, 1.0]);
        let values = m.forecast(3);
        assert_eq!(values, vec![13.0, 14.0, 15.0]);
    }

    #[test]
    fn test_day_offset_fractional() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        assert!((day_offset(a, b) - 1.5).abs() < 1e-12);
    }
}
