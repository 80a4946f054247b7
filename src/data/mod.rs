//! Dataset acquisition and preparation.
//!
//! - CSV ingest + row-level validation + imputation (`dataset`)
//! - HTTP download of the public training CSV (`download`)
//! - seeded synthetic fallback data (`synthetic`)
//!
//! Resolution order for a training run: an explicit `--csv` path is
//! authoritative (errors are fatal); otherwise a download is attempted unless
//! `--offline`; the synthetic dataset is the deterministic fallback.

pub mod dataset;
pub mod download;
pub mod synthetic;

pub use dataset::*;
pub use download::*;
pub use synthetic::*;

use crate::domain::TrainConfig;
use crate::error::AppError;

/// Where the training rows actually came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    CsvFile(std::path::PathBuf),
    Downloaded(std::path::PathBuf),
    Synthetic { rows: usize, seed: u64 },
}

impl DataSource {
    pub fn describe(&self) -> String {
        match self {
            DataSource::CsvFile(p) => format!("csv file '{}'", p.display()),
            DataSource::Downloaded(p) => format!("downloaded csv '{}'", p.display()),
            DataSource::Synthetic { rows, seed } => {
                format!("synthetic data (rows={rows}, seed={seed})")
            }
        }
    }
}

/// Load the training dataset per the configured resolution order.
pub fn resolve_dataset(config: &TrainConfig) -> Result<(LoadedDataset, DataSource), AppError> {
    if let Some(path) = &config.csv_path {
        let loaded = load_csv(path)?;
        return Ok((loaded, DataSource::CsvFile(path.clone())));
    }

    if !config.offline {
        match download_csv() {
            Ok(path) => {
                let loaded = load_csv(&path)?;
                return Ok((loaded, DataSource::Downloaded(path)));
            }
            Err(e) => {
                eprintln!("Download failed ({e}); falling back to synthetic data.");
            }
        }
    }

    let dataset = generate_synthetic(config.synthetic_rows, config.seed)?;
    let rows = dataset.len();
    Ok((
        LoadedDataset {
            dataset,
            rows_read: rows,
            row_errors: Vec::new(),
            imputed_fields: 0,
        },
        DataSource::Synthetic {
            rows,
            seed: config.seed,
        },
    ))
}
