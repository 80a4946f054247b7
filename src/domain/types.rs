//! Core types for the house price feature space.
//!
//! These types are intentionally lightweight and serializable so they can be:
//!
//! - used in-memory during training
//! - persisted as part of the model artifact bundle
//! - reconstructed per-request at serving time

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Numeric feature columns, in the canonical order used by every encoded row.
pub const NUMERIC_FEATURES: [&str; 5] = [
    "OverallQual",
    "GrLivArea",
    "TotalBsmtSF",
    "GarageCars",
    "YearBuilt",
];

/// The single categorical feature.
pub const CATEGORICAL_FEATURE: &str = "Neighborhood";

/// Target column in training data.
pub const TARGET_COLUMN: &str = "SalePrice";

/// Original (pre-encoding) feature names, in input order.
pub const ORIGINAL_FEATURES: [&str; 6] = [
    "OverallQual",
    "GrLivArea",
    "TotalBsmtSF",
    "GarageCars",
    "YearBuilt",
    "Neighborhood",
];

/// Neighborhood values used for synthetic data generation.
///
/// Real CSV input may contain a different category set; the schema is always
/// derived from whatever categories the training split actually contains.
pub const SYNTHETIC_NEIGHBORHOODS: [&str; 9] = [
    "Ames",
    "Edwards",
    "BriarDale",
    "OldTown",
    "Sawyer",
    "NoRidge",
    "NridgHt",
    "SomerSet",
    "CollgCr",
];

/// A single raw input record: the six features a caller supplies.
///
/// Numeric fields are stored as `f64` regardless of their nominal type
/// (quality score, square feet, car count, year) because the encoded feature
/// space is uniformly numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub overall_qual: f64,
    pub gr_liv_area: f64,
    pub total_bsmt_sf: f64,
    pub garage_cars: f64,
    pub year_built: f64,
    pub neighborhood: String,
}

impl Default for RawRecord {
    /// The documented serving-layer defaults, applied per missing field.
    fn default() -> Self {
        Self {
            overall_qual: 5.0,
            gr_liv_area: 1500.0,
            total_bsmt_sf: 1000.0,
            garage_cars: 2.0,
            year_built: 2000.0,
            neighborhood: "Ames".to_string(),
        }
    }
}

impl RawRecord {
    /// Numeric field values in `NUMERIC_FEATURES` order.
    pub fn numeric_values(&self) -> [f64; 5] {
        [
            self.overall_qual,
            self.gr_liv_area,
            self.total_bsmt_sf,
            self.garage_cars,
            self.year_built,
        ]
    }

    /// Build a record from a JSON object, applying the documented default for
    /// every absent (or null) field.
    ///
    /// Numeric fields accept JSON numbers or numeric strings (HTML forms post
    /// strings). A present-but-uncoercible field is an error naming the field,
    /// never a silent default.
    pub fn from_json(value: &Value) -> Result<Self, String> {
        let obj = value
            .as_object()
            .ok_or_else(|| "Request body must be a JSON object.".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            overall_qual: coerce_numeric(obj.get("OverallQual"), "OverallQual", defaults.overall_qual)?,
            gr_liv_area: coerce_numeric(obj.get("GrLivArea"), "GrLivArea", defaults.gr_liv_area)?,
            total_bsmt_sf: coerce_numeric(obj.get("TotalBsmtSF"), "TotalBsmtSF", defaults.total_bsmt_sf)?,
            garage_cars: coerce_numeric(obj.get("GarageCars"), "GarageCars", defaults.garage_cars)?,
            year_built: coerce_numeric(obj.get("YearBuilt"), "YearBuilt", defaults.year_built)?,
            neighborhood: coerce_string(obj.get("Neighborhood"), "Neighborhood", &defaults.neighborhood)?,
        })
    }
}

fn coerce_numeric(value: Option<&Value>, field: &str, default: f64) -> Result<f64, String> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value {
        Value::Null => Ok(default),
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("Field `{field}` is not a finite number: {n}")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("Field `{field}` cannot be parsed as a number: '{s}'")),
        other => Err(format!("Field `{field}` has unsupported type: {other}")),
    }
}

fn coerce_string(value: Option<&Value>, field: &str, default: &str) -> Result<String, String> {
    let Some(value) = value else {
        return Ok(default.to_string());
    };
    match value {
        Value::Null => Ok(default.to_string()),
        Value::String(s) => Ok(s.trim().to_string()),
        // Be liberal with scalars (a numeric neighborhood code is still a category).
        Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("Field `{field}` has unsupported type: {other}")),
    }
}

/// Which estimator to train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelSpec {
    /// Bagged CART regression trees (the default, matching the original model).
    Forest,
    /// Least-squares linear regression (SVD).
    Linear,
}

impl ModelSpec {
    /// Human-readable label for terminal output and the info endpoint.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelSpec::Forest => "Random Forest Regressor",
            ModelSpec::Linear => "Linear Regression (SVD least squares)",
        }
    }
}

// clap needs `Display` for `default_value_t`; emit the flag spelling.
impl std::fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelSpec::Forest => write!(f, "forest"),
            ModelSpec::Linear => write!(f, "linear"),
        }
    }
}

/// Random forest hyperparameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 20,
            min_samples_split: 5,
            min_samples_leaf: 2,
        }
    }
}

/// Evaluation metrics for one data split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub r2: f64,
}

/// A full training run's configuration, derived from CLI flags plus defaults.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Local CSV to train on. When absent, a download is attempted and the
    /// seeded synthetic dataset is the fallback.
    pub csv_path: Option<std::path::PathBuf>,
    /// Skip the network download attempt.
    pub offline: bool,
    /// Seed for the split shuffle, synthetic data, and forest bootstrap.
    pub seed: u64,
    /// Fraction of rows held out for evaluation.
    pub test_ratio: f64,
    /// Row count for the synthetic fallback dataset.
    pub synthetic_rows: usize,
    pub model: ModelSpec,
    pub forest: ForestParams,
    /// Directory receiving the persisted artifact bundle.
    pub model_dir: std::path::PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_applies_defaults_for_missing_fields() {
        let rec = RawRecord::from_json(&json!({})).unwrap();
        assert_eq!(rec, RawRecord::default());
    }

    #[test]
    fn from_json_accepts_numeric_strings() {
        let rec = RawRecord::from_json(&json!({
            "OverallQual": "7",
            "GrLivArea": 2100,
            "Neighborhood": "NoRidge",
        }))
        .unwrap();
        assert_eq!(rec.overall_qual, 7.0);
        assert_eq!(rec.gr_liv_area, 2100.0);
        assert_eq!(rec.neighborhood, "NoRidge");
        // Untouched fields keep defaults.
        assert_eq!(rec.garage_cars, 2.0);
    }

    #[test]
    fn from_json_rejects_uncoercible_field_with_detail() {
        let err = RawRecord::from_json(&json!({ "GrLivArea": "large" })).unwrap_err();
        assert!(err.contains("GrLivArea"), "error should name the field: {err}");
    }

    #[test]
    fn from_json_rejects_non_object_body() {
        assert!(RawRecord::from_json(&json!([1, 2, 3])).is_err());
    }
}
