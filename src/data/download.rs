//! Best-effort download of the public training CSV.
//!
//! Failures here are soft: the caller falls back to synthetic data, so this
//! module reports errors but never aborts a training run on its own.

use std::path::PathBuf;

use crate::error::AppError;

/// Candidate dataset mirrors, tried in order.
const DATASET_SOURCES: [&str; 1] =
    ["https://raw.githubusercontent.com/awesomedata/awesome-public-datasets/master/datasets/Kaggle/train.csv"];

/// Local file name the downloaded CSV is written to.
const DOWNLOAD_PATH: &str = "train.csv";

/// Try each source until one yields a response; write the bytes to disk and
/// return the path.
pub fn download_csv() -> Result<PathBuf, AppError> {
    let mut last_error = String::from("no sources configured");

    for url in DATASET_SOURCES {
        match fetch(url) {
            Ok(bytes) => {
                let path = PathBuf::from(DOWNLOAD_PATH);
                std::fs::write(&path, &bytes).map_err(|e| {
                    AppError::internal(format!(
                        "Failed to write downloaded CSV '{}': {e}",
                        path.display()
                    ))
                })?;
                return Ok(path);
            }
            Err(e) => last_error = format!("{url}: {e}"),
        }
    }

    Err(AppError::input(format!("All dataset sources failed; last error: {last_error}")))
}

fn fetch(url: &str) -> Result<Vec<u8>, String> {
    let response = reqwest::blocking::get(url).map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }
    let bytes = response.bytes().map_err(|e| e.to_string())?;
    if bytes.is_empty() {
        return Err("empty response body".to_string());
    }
    Ok(bytes.to_vec())
}
