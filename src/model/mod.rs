//! The opaque predictor capability.
//!
//! The rest of the pipeline only relies on the fit/predict contract:
//! `fit(X, y) -> state` and `predict(row) -> price`, deterministic for a fixed
//! seed and fixed inputs. Any estimator honoring that contract is
//! substitutable; two are provided:
//!
//! - `forest`: bagged CART regression trees (default, matches the original)
//! - `linear`: SVD least squares

pub mod forest;
pub mod linear;

pub use forest::RandomForest;
pub use linear::LinearModel;

use serde::{Deserialize, Serialize};

use crate::domain::{ForestParams, ModelSpec};
use crate::error::AppError;

/// A fitted, serializable predictor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum PredictorState {
    RandomForest(RandomForest),
    Linear(LinearModel),
}

impl PredictorState {
    /// Fit the requested estimator on a scaled row-major training matrix.
    pub fn fit(
        spec: ModelSpec,
        x: &[Vec<f64>],
        y: &[f64],
        forest_params: &ForestParams,
        seed: u64,
    ) -> Result<Self, AppError> {
        match spec {
            ModelSpec::Forest => Ok(Self::RandomForest(RandomForest::fit(x, y, forest_params, seed)?)),
            ModelSpec::Linear => Ok(Self::Linear(LinearModel::fit(x, y)?)),
        }
    }

    /// Predict one scaled row. Length is validated by callers.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        match self {
            Self::RandomForest(m) => m.predict_row(row),
            Self::Linear(m) => m.predict_row(row),
        }
    }

    pub fn predict_all(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|r| self.predict_row(r)).collect()
    }

    /// Number of feature columns this predictor was fitted on.
    ///
    /// Used when reloading artifacts to verify the bundle is internally
    /// consistent with the schema.
    pub fn n_features(&self) -> usize {
        match self {
            Self::RandomForest(m) => m.n_features,
            Self::Linear(m) => m.coefficients.len(),
        }
    }

    pub fn spec(&self) -> ModelSpec {
        match self {
            Self::RandomForest(_) => ModelSpec::Forest,
            Self::Linear(_) => ModelSpec::Linear,
        }
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.spec().display_name()
    }
}
