//! Least-squares linear regression.
//!
//! We solve `minimize Σ (y_i - x_i^T β)^2` with an explicit intercept column.
//! SVD is used rather than QR because the design matrix is tall (rows >>
//! columns) and one-hot indicator columns can be nearly collinear; SVD solves
//! both robustly. A ladder of tolerances accepts progressively less strict
//! solutions before giving up.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn fit(x: &[Vec<f64>], y: &[f64]) -> Result<Self, AppError> {
        let first = x
            .first()
            .ok_or_else(|| AppError::no_data("Cannot fit a linear model on an empty matrix."))?;
        let n_features = first.len();
        if x.iter().any(|r| r.len() != n_features) {
            return Err(AppError::internal("Ragged training matrix (row lengths differ)."));
        }
        if x.len() != y.len() {
            return Err(AppError::internal(format!(
                "Training matrix has {} rows but target has {} values.",
                x.len(),
                y.len()
            )));
        }

        let n = x.len();
        let design = DMatrix::from_fn(n, n_features + 1, |r, c| {
            if c == 0 { 1.0 } else { x[r][c - 1] }
        });
        let target = DVector::from_iterator(n, y.iter().copied());

        let beta = solve_least_squares(&design, &target).ok_or_else(|| {
            AppError::internal("Linear system is too ill-conditioned to solve robustly.")
        })?;

        Ok(Self {
            intercept: beta[0],
            coefficients: beta.iter().skip(1).copied().collect(),
        })
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, v)| c * v)
                .sum::<f64>()
    }
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system cannot be solved with a finite result at any
/// of the candidate tolerances.
fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_linear_relationship() {
        // y = 2 + 3a - 4b, noiseless.
        let x: Vec<Vec<f64>> = (0..30)
            .map(|i| vec![(i % 7) as f64, (i % 5) as f64])
            .collect();
        let y: Vec<f64> = x.iter().map(|r| 2.0 + 3.0 * r[0] - 4.0 * r[1]).collect();

        let model = LinearModel::fit(&x, &y).unwrap();
        assert!((model.intercept - 2.0).abs() < 1e-8);
        assert!((model.coefficients[0] - 3.0).abs() < 1e-8);
        assert!((model.coefficients[1] + 4.0).abs() < 1e-8);
        assert!((model.predict_row(&[2.0, 1.0]) - 4.0).abs() < 1e-8);
    }

    #[test]
    fn survives_a_constant_column() {
        // A scaled constant column is all zeros; the coefficient is free but
        // the fit must still produce finite, usable parameters.
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, 0.0]).collect();
        let y: Vec<f64> = x.iter().map(|r| 5.0 * r[0] + 1.0).collect();

        let model = LinearModel::fit(&x, &y).unwrap();
        assert!(model.intercept.is_finite());
        assert!(model.coefficients.iter().all(|c| c.is_finite()));
        assert!((model.predict_row(&[4.0, 0.0]) - 21.0).abs() < 1e-6);
    }

    #[test]
    fn fit_rejects_empty_input() {
        assert!(LinearModel::fit(&[], &[]).is_err());
    }
}
