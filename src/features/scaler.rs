//! Fitted per-column standardization.
//!
//! Statistics are computed once from the training matrix and applied uniformly
//! afterwards. Population standard deviation (divide by n) is used, matching
//! the scaler the original pipeline delegated to.
//!
//! Zero-variance guard: a constant column (for example an indicator for a
//! category that appears in every training row, or never) has stddev 0. We
//! store 1.0 in that position so transforms subtract the mean and divide by
//! one instead of propagating NaN/Inf.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Stddevs at or below this are treated as zero variance.
const STD_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    pub stddevs: Vec<f64>,
}

impl StandardScaler {
    /// Fit per-column mean and population stddev over a row-major matrix.
    ///
    /// All rows must have the same length; training matrices built by
    /// `encoder::encode_all` satisfy this by construction, but hand-built
    /// input is checked anyway.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, AppError> {
        let first = rows
            .first()
            .ok_or_else(|| AppError::no_data("Cannot fit a scaler on an empty matrix."))?;
        let n_cols = first.len();
        if rows.iter().any(|r| r.len() != n_cols) {
            return Err(AppError::internal(
                "Cannot fit a scaler on a ragged matrix (row lengths differ).",
            ));
        }

        let n = rows.len() as f64;
        let mut means = vec![0.0; n_cols];
        for row in rows {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut vars = vec![0.0; n_cols];
        for row in rows {
            for ((var, v), m) in vars.iter_mut().zip(row).zip(&means) {
                let d = v - m;
                *var += d * d;
            }
        }

        let stddevs = vars
            .into_iter()
            .map(|var| {
                let sd = (var / n).sqrt();
                if sd <= STD_EPS { 1.0 } else { sd }
            })
            .collect();

        Ok(Self { means, stddevs })
    }

    /// Column count this scaler was fitted on.
    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// Standardize one row: `(x - mean) / stddev` per column.
    ///
    /// Callers validate that `row.len() == self.len()` (the serving context
    /// reports a length disagreement as a schema mismatch); extra trailing
    /// values on either side are ignored by the zip.
    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.stddevs))
            .map(|(v, (m, sd))| (v - m) / sd)
            .collect()
    }

    /// Standardize a batch of rows.
    pub fn transform_all(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform(r)).collect()
    }

    /// Structural self-check when reloading from disk.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.means.len() != self.stddevs.len() {
            return Err(AppError::input(format!(
                "Scaler is inconsistent: {} means but {} stddevs.",
                self.means.len(),
                self.stddevs.len()
            )));
        }
        if self
            .means
            .iter()
            .chain(&self.stddevs)
            .any(|v| !v.is_finite())
        {
            return Err(AppError::input("Scaler contains non-finite statistics."));
        }
        if self.stddevs.iter().any(|&sd| sd <= 0.0) {
            return Err(AppError::input("Scaler contains non-positive stddevs."));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fitted_matrix_standardizes_to_zero_mean_unit_variance() {
        let rows = vec![
            vec![1.0, 10.0],
            vec![2.0, 20.0],
            vec![3.0, 30.0],
            vec![4.0, 40.0],
        ];
        let scaler = StandardScaler::fit(&rows).unwrap();
        let scaled = scaler.transform_all(&rows);

        let n = scaled.len() as f64;
        for col in 0..2 {
            let mean: f64 = scaled.iter().map(|r| r[col]).sum::<f64>() / n;
            let var: f64 = scaled.iter().map(|r| (r[col] - mean).powi(2)).sum::<f64>() / n;
            assert!(mean.abs() < 1e-12, "col {col} mean {mean}");
            assert!((var - 1.0).abs() < 1e-12, "col {col} var {var}");
        }
    }

    #[test]
    fn constant_column_never_produces_nan() {
        let rows = vec![vec![7.0, 1.0], vec![7.0, 2.0], vec![7.0, 3.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        assert_eq!(scaler.stddevs[0], 1.0);

        for row in scaler.transform_all(&rows) {
            assert!(row.iter().all(|v| v.is_finite()), "non-finite in {row:?}");
        }
        // Constant column scales to exactly zero.
        assert_eq!(scaler.transform(&[7.0, 2.0])[0], 0.0);
    }

    #[test]
    fn fit_uses_population_stddev() {
        let rows = vec![vec![1.0], vec![3.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        // Population stddev of {1, 3} is 1 (sample stddev would be sqrt(2)).
        assert!((scaler.stddevs[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn fit_rejects_empty_and_ragged_input() {
        assert!(StandardScaler::fit(&[]).is_err());
        assert!(StandardScaler::fit(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn validate_rejects_length_disagreement() {
        let scaler = StandardScaler {
            means: vec![0.0, 0.0],
            stddevs: vec![1.0],
        };
        assert!(scaler.validate().is_err());
    }
}
