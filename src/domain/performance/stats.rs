use statrs::statistics::{Data, Distribution};

/// Shared statistics utilities for forecast evaluation.
pub struct Stats;

impl Stats {
    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Sample standard deviation (n-1); 0 for fewer than two values
    pub fn std_dev(values: &[f64]) -> f64 {
        if values.len() < 2 {
            return 0.0;
        }
        Data::new(values.to_vec())
            .std_dev()
            .filter(|s| s.is_finite())
            .unwrap_or(0.0)
    }

    /// Root mean squared error between paired series
    pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
        let n = actual.len().min(predicted.len());
        if n == 0 {
            return 0.0;
        }
        let sse: f64 = actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| (a - p).powi(2))
            .sum();
        (sse / n as f64).sqrt()
    }

    /// Mean absolute percentage error, in percent. Zero actuals are skipped.
    pub fn mape(actual: &[f64], predicted: &[f64]) -> f64 {
        let errors: Vec<f64> = actual
            .iter()
            .zip(predicted)
            .filter(|(a, _)| a.abs() > f64::EPSILON)
            .map(|(a, p)| ((a - p) / a).abs())
            .collect();
        Self::mean(&errors) * 100.0
    }

    /// Coefficient of determination against the mean of `actual`, clipped to [0, 1].
    ///
    /// A constant actual series scores 1 when matched exactly, else 0.
    pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
        let n = actual.len().min(predicted.len());
        if n == 0 {
            return 0.0;
        }
        let actual = &actual[..n];
        let mean = Self::mean(actual);

        let ss_res: f64 = actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| (a - p).powi(2))
            .sum();
        let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

        if ss_tot <= f64::EPSILON {
            return if ss_res <= f64::EPSILON { 1.0 } else { 0.0 };
        }
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_fit() {
        let actual = vec![1.0, 2.0, 3.0];
        assert_eq!(Stats::rmse(&actual, &actual), 0.0);
        assert_eq!(Stats::mape(&actual, &actual), 0.0);
        assert_eq!(Stats::r_squared(&actual, &actual), 1.0);
    }

    #[test]
    fn test_error_metrics() {
        let actual = vec![100.0, 200.0];
        let predicted = vec![110.0, 180.0];
        // sqrt((100 + 400) / 2)
        assert!((Stats::rmse(&actual, &predicted) - 250.0_f64.sqrt()).abs() < 1e-12);
        // (10% + 10%) / 2
        assert!((Stats::mape(&actual, &predicted) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_r_squared_clipped_at_zero() {
        let actual = vec![1.0, 2.0, 3.0];
        let predicted = vec![3.0, 2.0, 1.0];
        assert_eq!(Stats::r_squared(&actual, &predicted), 0.0);
    }

    #[test]
    fn test_r_squared_constant_series() {
        assert_eq!(Stats::r_squared(&[5.0, 5.0], &[5.0, 5.0]), 1.0);
        assert_eq!(Stats::r_squared(&[5.0, 5.0], &[4.0, 6.0]), 0.0);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(Stats::std_dev(&[1.0]), 0.0);
        let sd = Stats::std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        // sample stdev of the classic example
        assert!((sd - 2.138_089_935).abs() < 1e-6);
    }
}
