//! The training pipeline shared by the CLI (and exercised by integration
//! tests).
//!
//! Order matters here: the schema and the scaler statistics are fitted on the
//! training split only, then applied to both splits. Letting evaluation rows
//! leak into either fit would quietly inflate the reported metrics.

use chrono::Utc;

use crate::data::{self, DataSource, RowError};
use crate::domain::{EvalMetrics, TrainConfig};
use crate::error::AppError;
use crate::features::{encoder, StandardScaler};
use crate::io::{self, TrainedArtifacts};
use crate::model::PredictorState;
use crate::report;

/// All computed outputs of a single `hp train` run.
#[derive(Debug, Clone)]
pub struct TrainOutput {
    pub artifacts: TrainedArtifacts,
    pub train_metrics: EvalMetrics,
    pub test_metrics: EvalMetrics,
    pub n_train: usize,
    pub n_test: usize,
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
    pub imputed_fields: usize,
    pub source: DataSource,
}

/// Execute the full training pipeline and persist the artifact bundle.
pub fn run_train(config: &TrainConfig) -> Result<TrainOutput, AppError> {
    // 1) Acquire rows (CSV -> download -> synthetic) with imputation applied.
    let (loaded, source) = data::resolve_dataset(config)?;

    // 2) Seeded shuffle split. Everything fitted below sees the train split only.
    let (train, test) = data::train_test_split(&loaded.dataset, config.test_ratio, config.seed)?;

    // 3) Freeze the schema from the training categories.
    let schema = encoder::fit_schema(&train.records)?;
    let x_train = encoder::encode_all(&train.records, &schema);
    let x_test = encoder::encode_all(&test.records, &schema);

    // 4) Fit the scaler on the training matrix; transform both splits.
    let scaler = StandardScaler::fit(&x_train)?;
    let x_train = scaler.transform_all(&x_train);
    let x_test = scaler.transform_all(&x_test);

    // 5) Fit the predictor on scaled training data.
    let predictor = PredictorState::fit(
        config.model,
        &x_train,
        &train.targets,
        &config.forest,
        config.seed,
    )?;

    // 6) Evaluate on both splits.
    let train_metrics = report::evaluate(&train.targets, &predictor.predict_all(&x_train))?;
    let test_metrics = report::evaluate(&test.targets, &predictor.predict_all(&x_test))?;

    // 7) Persist the bundle as one unit.
    let artifacts = TrainedArtifacts {
        predictor,
        scaler,
        schema,
        trained_at: Utc::now().date_naive(),
        seed: config.seed,
    };
    io::write_artifacts(&config.model_dir, &artifacts)?;

    Ok(TrainOutput {
        artifacts,
        train_metrics,
        test_metrics,
        n_train: train.len(),
        n_test: test.len(),
        rows_read: loaded.rows_read,
        row_errors: loaded.row_errors,
        imputed_fields: loaded.imputed_fields,
        source,
    })
}
