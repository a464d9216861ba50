use crate::domain::errors::PredictionError;
use crate::domain::ml::FittedModel;
use crate::domain::ml::polynomial::day_offset;
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use tracing::debug;

pub const DEFAULT_DEGREE: usize = 2;

/// Pivots smaller than this fraction of the largest normal-matrix entry are singular
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Least-squares polynomial fitting over day offsets
#[derive(Debug, Clone)]
pub struct PolynomialFitter {
    degree: usize,
}

impl Default for PolynomialFitter {
    fn default() -> Self {
        Self::new(DEFAULT_DEGREE)
    }
}

impl PolynomialFitter {
    pub fn new(degree: usize) -> Self {
        Self { degree }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Fit `series` (chronological `(date, value)` pairs) by solving the
    /// normal equations `(AᵀA)c = Aᵀy` for the Vandermonde matrix `A`.
    pub fn fit(&self, series: &[(DateTime<Utc>, f64)]) -> Result<FittedModel, PredictionError> {
        let terms = self.degree + 1;
        if series.len() < terms {
            return Err(PredictionError::InsufficientData {
                required: terms,
                available: series.len(),
            });
        }
        if series.iter().any(|(_, y)| !y.is_finite()) {
            return Err(PredictionError::ModelFit {
                reason: "series contains non-finite values".to_string(),
            });
        }

        let first_date = series[0].0;
        let last_date = series[series.len() - 1].0;

        let a = Array2::from_shape_fn((series.len(), terms), |(i, j)| {
            day_offset(first_date, series[i].0).powi(j as i32)
        });
        let y = Array1::from_iter(series.iter().map(|(_, value)| *value));

        let at = a.t();
        let ata = at.dot(&a);
        let aty = at.dot(&y);

        let coefficients = solve(ata, aty)?;

        debug!(
            "PolynomialFitter: degree {} over {} samples -> {:?}",
            self.degree,
            series.len(),
            coefficients
        );

        Ok(FittedModel {
            degree: self.degree,
            coefficients,
            first_date,
            last_date,
        })
    }

    /// One value per day offset `1..=days` after the last sample
    pub fn predict(&self, model: &FittedModel, days: u32) -> Vec<f64> {
        model.forecast(days)
    }
}

/// Gaussian elimination with partial pivoting
fn solve(mut m: Array2<f64>, mut rhs: Array1<f64>) -> Result<Vec<f64>, PredictionError> {
    let n = rhs.len();
    let scale = m.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if !scale.is_finite() || scale == 0.0 {
        return Err(PredictionError::ModelFit {
            reason: "normal matrix is degenerate".to_string(),
        });
    }
    let tolerance = scale * SINGULAR_TOLERANCE;

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| m[[r1, col]].abs().total_cmp(&m[[r2, col]].abs()))
            .unwrap_or(col);

        if m[[pivot_row, col]].abs() <= tolerance {
            return Err(PredictionError::ModelFit {
                reason: format!("singular system at column {} (duplicate x-values?)", col),
            });
        }

        if pivot_row != col {
            for k in 0..n {
                m.swap([col, k], [pivot_row, k]);
            }
            rhs.swap(col, pivot_row);
        }

        let pivot = m[[col, col]];
        for row in (col + 1)..n {
            let factor = m[[row, col]] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                m[[row, k]] -= factor * m[[col, k]];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| m[[row, k]] * solution[k]).sum();
        solution[row] = (rhs[row] - tail) / m[[row, row]];
    }

    if solution.iter().any(|c| !c.is_finite()) {
        return Err(PredictionError::ModelFit {
            reason: "solution is not finite".to_string(),
        });
    }
    Ok(solution)
}
