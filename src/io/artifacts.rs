//! Read/write the trained artifact bundle.
//!
//! The bundle is three independently loadable JSON blobs under one directory:
//!
//! - `schema.json`    — the frozen encoded-column schema
//! - `scaler.json`    — fitted standardization statistics
//! - `predictor.json` — estimator state plus run metadata (trained-at, seed)
//!
//! They are versioned as a unit: loading fails with a descriptive error if
//! any blob is missing, unreadable, or shape-inconsistent with the others.
//! Loading one without the matching others is an error state, not partial
//! functionality.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::features::{Schema, StandardScaler};
use crate::model::PredictorState;

pub const SCHEMA_FILE: &str = "schema.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const PREDICTOR_FILE: &str = "predictor.json";

/// The (predictor, scaler, schema) triple plus run metadata.
#[derive(Debug, Clone)]
pub struct TrainedArtifacts {
    pub predictor: PredictorState,
    pub scaler: StandardScaler,
    pub schema: Schema,
    pub trained_at: NaiveDate,
    pub seed: u64,
}

/// On-disk shape of `predictor.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PredictorBlob {
    trained_at: NaiveDate,
    seed: u64,
    state: PredictorState,
}

/// Write the bundle, creating `dir` if needed.
pub fn write_artifacts(dir: &Path, artifacts: &TrainedArtifacts) -> Result<(), AppError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::internal(format!(
            "Failed to create model directory '{}': {e}",
            dir.display()
        ))
    })?;

    write_json(&dir.join(SCHEMA_FILE), &artifacts.schema)?;
    write_json(&dir.join(SCALER_FILE), &artifacts.scaler)?;
    write_json(
        &dir.join(PREDICTOR_FILE),
        &PredictorBlob {
            trained_at: artifacts.trained_at,
            seed: artifacts.seed,
            state: artifacts.predictor.clone(),
        },
    )?;

    Ok(())
}

/// Load and cross-validate the bundle.
pub fn load_artifacts(dir: &Path) -> Result<TrainedArtifacts, AppError> {
    let missing: Vec<PathBuf> = [SCHEMA_FILE, SCALER_FILE, PREDICTOR_FILE]
        .iter()
        .map(|f| dir.join(f))
        .filter(|p| !p.exists())
        .collect();
    if !missing.is_empty() {
        let list: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
        return Err(AppError::input(format!(
            "Model artifacts missing: {}. Run `hp train` first.",
            list.join(", ")
        )));
    }

    let schema: Schema = read_json(&dir.join(SCHEMA_FILE))?;
    let scaler: StandardScaler = read_json(&dir.join(SCALER_FILE))?;
    let blob: PredictorBlob = read_json(&dir.join(PREDICTOR_FILE))?;

    schema.validate()?;
    scaler.validate()?;

    if scaler.len() != schema.len() {
        return Err(AppError::input(format!(
            "Artifact bundle is inconsistent: scaler covers {} columns but schema has {}.",
            scaler.len(),
            schema.len()
        )));
    }
    if blob.state.n_features() != schema.len() {
        return Err(AppError::input(format!(
            "Artifact bundle is inconsistent: predictor expects {} columns but schema has {}.",
            blob.state.n_features(),
            schema.len()
        )));
    }

    Ok(TrainedArtifacts {
        predictor: blob.state,
        scaler,
        schema,
        trained_at: blob.trained_at,
        seed: blob.seed,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::internal(format!("Failed to create '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| AppError::internal(format!("Failed to write '{}': {e}", path.display())))?;
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Invalid artifact file '{}': {e}", path.display())))
}
