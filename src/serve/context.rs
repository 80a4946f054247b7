//! The immutable serving context.
//!
//! Constructed once at process start from the artifact bundle and treated as
//! read-only for the lifetime of the process; concurrent requests may share
//! it without synchronization because nothing is ever mutated after load.
//! Rebuilding requires a restart.

use std::path::Path;

use serde_json::Value;

use crate::domain::{RawRecord, ORIGINAL_FEATURES};
use crate::error::AppError;
use crate::features::encoder;
use crate::io::{self, TrainedArtifacts};
use crate::report::format_currency;

/// Per-request failure taxonomy.
///
/// None of these corrupt shared state or require a restart; each request
/// either produces a `Prediction` or one of these, synchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictError {
    /// The artifact bundle was absent at startup.
    ModelNotLoaded,
    /// A raw field could not be coerced; the detail names the field.
    MalformedInput(String),
    /// An encoded row's column count disagrees with the loaded schema.
    ///
    /// Cannot occur while the encoder reindexes correctly, but it is checked
    /// on every request and reported distinctly from malformed input.
    SchemaMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for PredictError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictError::ModelNotLoaded => {
                write!(f, "Model not loaded. Please ensure model files are present.")
            }
            PredictError::MalformedInput(detail) => write!(f, "{detail}"),
            PredictError::SchemaMismatch { expected, actual } => write!(
                f,
                "Internal schema mismatch: encoded row has {actual} columns but the schema expects {expected}."
            ),
        }
    }
}

impl std::error::Error for PredictError {}

/// A successful prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub price: f64,
    pub formatted: String,
}

/// Model metadata exposed by the info endpoint.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelInfo {
    pub algorithm: String,
    pub features: Vec<String>,
    pub neighborhoods: Vec<String>,
    pub feature_count: usize,
}

pub struct ServingContext {
    artifacts: TrainedArtifacts,
}

impl ServingContext {
    pub fn new(artifacts: TrainedArtifacts) -> Self {
        Self { artifacts }
    }

    /// Load the bundle from `dir`; shape validation happens in the loader.
    pub fn load(dir: &Path) -> Result<Self, AppError> {
        Ok(Self::new(io::load_artifacts(dir)?))
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            algorithm: self.artifacts.predictor.algorithm_name().to_string(),
            features: ORIGINAL_FEATURES.iter().map(|s| s.to_string()).collect(),
            neighborhoods: self.artifacts.schema.categories.clone(),
            feature_count: self.artifacts.schema.len(),
        }
    }

    /// Category values the schema recognizes (including the reference).
    pub fn neighborhoods(&self) -> &[String] {
        &self.artifacts.schema.categories
    }

    /// Parse a JSON body and predict, mapping coercion failures to
    /// `MalformedInput`.
    pub fn predict_json(&self, body: &Value) -> Result<Prediction, PredictError> {
        let record = RawRecord::from_json(body).map_err(PredictError::MalformedInput)?;
        self.predict_record(&record)
    }

    /// Run the encode -> scale -> predict chain for one record.
    ///
    /// This is exactly the chain the training pipeline used, applied with the
    /// frozen schema and scaler, so the row is structurally identical to the
    /// training matrix by construction. The length check makes that invariant
    /// observable instead of assumed.
    pub fn predict_record(&self, record: &RawRecord) -> Result<Prediction, PredictError> {
        let schema = &self.artifacts.schema;
        let encoded = encoder::encode(record, schema);
        if encoded.len() != schema.len() {
            return Err(PredictError::SchemaMismatch {
                expected: schema.len(),
                actual: encoded.len(),
            });
        }
        if self.artifacts.scaler.len() != schema.len() {
            return Err(PredictError::SchemaMismatch {
                expected: schema.len(),
                actual: self.artifacts.scaler.len(),
            });
        }

        let scaled = self.artifacts.scaler.transform(&encoded);
        let price = self.artifacts.predictor.predict_row(&scaled);

        Ok(Prediction {
            price,
            formatted: format_currency(price),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_train;
    use crate::domain::{ForestParams, ModelSpec, TrainConfig};
    use serde_json::json;

    fn trained_context() -> ServingContext {
        let dir = tempfile::tempdir().unwrap();
        let config = TrainConfig {
            csv_path: None,
            offline: true,
            seed: 42,
            test_ratio: 0.2,
            synthetic_rows: 200,
            model: ModelSpec::Linear,
            forest: ForestParams::default(),
            model_dir: dir.path().to_path_buf(),
        };
        let output = run_train(&config).unwrap();
        ServingContext::new(output.artifacts)
    }

    #[test]
    fn predicts_for_known_and_unknown_neighborhoods() {
        let ctx = trained_context();

        let known = ctx.predict_json(&json!({ "Neighborhood": "OldTown" })).unwrap();
        assert!(known.price.is_finite());
        assert!(known.formatted.starts_with('$') || known.formatted.starts_with("-$"));

        // Unknown categories take the reference-category encoding.
        let unknown = ctx.predict_json(&json!({ "Neighborhood": "Atlantis" })).unwrap();
        let reference = ctx
            .predict_json(&json!({ "Neighborhood": ctx.neighborhoods()[0].clone() }))
            .unwrap();
        assert!((unknown.price - reference.price).abs() < 1e-9);
    }

    #[test]
    fn malformed_field_is_a_client_error_with_detail() {
        let ctx = trained_context();
        let err = ctx.predict_json(&json!({ "YearBuilt": [] })).unwrap_err();
        match err {
            PredictError::MalformedInput(detail) => assert!(detail.contains("YearBuilt")),
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn empty_body_predicts_with_defaults() {
        let ctx = trained_context();
        let from_empty = ctx.predict_json(&json!({})).unwrap();
        let from_defaults = ctx.predict_record(&RawRecord::default()).unwrap();
        assert_eq!(from_empty, from_defaults);
    }

    #[test]
    fn info_reports_schema_shape() {
        let ctx = trained_context();
        let info = ctx.info();
        assert_eq!(info.features, ORIGINAL_FEATURES.to_vec());
        assert_eq!(info.feature_count, 5 + info.neighborhoods.len() - 1);
        assert_eq!(info.algorithm, "Linear Regression (SVD least squares)");
    }
}
