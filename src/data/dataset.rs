//! CSV ingest, imputation, and the seeded train/test split.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors, exit code 2)
//! - **Row-level validation**: a bad row is skipped and reported, never fatal
//! - **Deterministic behavior**: imputation ties and the split shuffle are
//!   reproducible for a fixed seed

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::domain::{RawRecord, CATEGORICAL_FEATURE, NUMERIC_FEATURES, TARGET_COLUMN};
use crate::error::AppError;

/// Parallel record/target arrays; `targets[i]` belongs to `records[i]`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<RawRecord>,
    pub targets: Vec<f64>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the usable dataset plus bookkeeping for the run summary.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
    /// Count of individual missing feature values filled by imputation.
    pub imputed_fields: usize,
}

/// One parsed CSV row before imputation; every feature may be missing.
#[derive(Debug, Clone, Default)]
struct PartialRow {
    numeric: [Option<f64>; 5],
    neighborhood: Option<String>,
    sale_price: f64,
}

/// Load a training CSV with the six feature columns plus `SalePrice`.
///
/// Missing feature values are imputed (numeric: column mean; categorical:
/// modal value, lexicographically-smallest on ties). Rows without a usable
/// target are skipped and reported, since a target cannot be imputed honestly.
pub fn load_csv(path: &Path) -> Result<LoadedDataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for required in NUMERIC_FEATURES
        .iter()
        .chain([&CATEGORICAL_FEATURE, &TARGET_COLUMN])
    {
        if !header_map.contains_key(&required.to_lowercase()) {
            return Err(AppError::input(format!(
                "CSV '{}' is missing required column `{required}`.",
                path.display()
            )));
        }
    }

    let mut partials = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header row, and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(row) => partials.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if partials.is_empty() {
        return Err(AppError::no_data(format!(
            "CSV '{}' contains no usable rows ({} skipped).",
            path.display(),
            row_errors.len()
        )));
    }

    let (dataset, imputed_fields) = impute(partials);

    Ok(LoadedDataset {
        dataset,
        rows_read,
        row_errors,
        imputed_fields,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_lowercase(), i))
        .collect()
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<PartialRow, String> {
    let mut row = PartialRow::default();

    for (slot, name) in row.numeric.iter_mut().zip(NUMERIC_FEATURES) {
        *slot = get_optional(record, header_map, name).and_then(|s| parse_finite(s));
    }
    row.neighborhood =
        get_optional(record, header_map, CATEGORICAL_FEATURE).map(str::to_string);

    let target = get_optional(record, header_map, TARGET_COLUMN)
        .ok_or_else(|| format!("Missing required value: `{TARGET_COLUMN}`"))?;
    row.sale_price = parse_finite(target)
        .ok_or_else(|| format!("Invalid `{TARGET_COLUMN}` value: '{target}'"))?;

    Ok(row)
}

fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(&name.to_lowercase())?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "NA")
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Fill missing values: column mean for numerics, modal value for the
/// neighborhood. A column with no observed values at all takes the documented
/// serving-layer default for that field.
fn impute(partials: Vec<PartialRow>) -> (Dataset, usize) {
    let defaults = RawRecord::default();
    let default_numeric = defaults.numeric_values();

    let mut fill = [0.0; 5];
    for (col, fill_value) in fill.iter_mut().enumerate() {
        let present: Vec<f64> = partials.iter().filter_map(|r| r.numeric[col]).collect();
        *fill_value = if present.is_empty() {
            default_numeric[col]
        } else {
            present.iter().sum::<f64>() / present.len() as f64
        };
    }

    let modal = modal_neighborhood(&partials).unwrap_or(defaults.neighborhood);

    let mut imputed_fields = 0usize;
    let mut dataset = Dataset::default();
    for row in partials {
        let mut values = [0.0; 5];
        for (col, value) in values.iter_mut().enumerate() {
            *value = match row.numeric[col] {
                Some(v) => v,
                None => {
                    imputed_fields += 1;
                    fill[col]
                }
            };
        }
        let neighborhood = match row.neighborhood {
            Some(n) => n,
            None => {
                imputed_fields += 1;
                modal.clone()
            }
        };

        dataset.records.push(RawRecord {
            overall_qual: values[0],
            gr_liv_area: values[1],
            total_bsmt_sf: values[2],
            garage_cars: values[3],
            year_built: values[4],
            neighborhood,
        });
        dataset.targets.push(row.sale_price);
    }

    (dataset, imputed_fields)
}

fn modal_neighborhood(partials: &[PartialRow]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in partials {
        if let Some(n) = &row.neighborhood {
            *counts.entry(n.as_str()).or_insert(0) += 1;
        }
    }
    // Ties break toward the lexicographically smallest value so imputation is
    // deterministic regardless of hash iteration order.
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(name, _)| name.to_string())
}

/// Shuffle and split into training/evaluation subsets.
///
/// The test subset takes `ceil(n * test_ratio)` rows of the shuffled order;
/// 1460 rows at ratio 0.2 give the canonical 1168/292 split.
pub fn train_test_split(
    data: &Dataset,
    test_ratio: f64,
    seed: u64,
) -> Result<(Dataset, Dataset), AppError> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(AppError::input(format!(
            "Test ratio must be in (0, 1), got {test_ratio}."
        )));
    }
    let n = data.len();
    if n < 2 {
        return Err(AppError::no_data("Need at least 2 rows to split train/test."));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_len = ((n as f64 * test_ratio).ceil() as usize).clamp(1, n - 1);
    let (test_idx, train_idx) = indices.split_at(test_len);

    Ok((take(data, train_idx), take(data, test_idx)))
}

fn take(data: &Dataset, indices: &[usize]) -> Dataset {
    Dataset {
        records: indices.iter().map(|&i| data.records[i].clone()).collect(),
        targets: indices.iter().map(|&i| data.targets[i]).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const HEADER: &str = "OverallQual,GrLivArea,TotalBsmtSF,GarageCars,YearBuilt,Neighborhood,SalePrice\n";

    #[test]
    fn loads_a_clean_csv() {
        let file = write_csv(&format!(
            "{HEADER}7,2000,800,2,1995,OldTown,250000\n5,1500,1000,1,2005,Ames,180000\n"
        ));
        let loaded = load_csv(file.path()).unwrap();
        assert_eq!(loaded.rows_read, 2);
        assert_eq!(loaded.dataset.len(), 2);
        assert!(loaded.row_errors.is_empty());
        assert_eq!(loaded.dataset.records[0].neighborhood, "OldTown");
        assert_eq!(loaded.dataset.targets[1], 180000.0);
    }

    #[test]
    fn imputes_numeric_mean_and_modal_neighborhood() {
        let file = write_csv(&format!(
            "{HEADER}4,1000,,1,1990,Ames,100000\n8,3000,,3,2010,Ames,400000\n6,2000,500,2,2000,,200000\n"
        ));
        let loaded = load_csv(file.path()).unwrap();
        assert_eq!(loaded.dataset.len(), 3);
        assert_eq!(loaded.imputed_fields, 3);
        // TotalBsmtSF mean over the single present value (500).
        assert_eq!(loaded.dataset.records[0].total_bsmt_sf, 500.0);
        // Modal neighborhood fills the missing one.
        assert_eq!(loaded.dataset.records[2].neighborhood, "Ames");
    }

    #[test]
    fn skips_rows_without_a_target() {
        let file = write_csv(&format!(
            "{HEADER}7,2000,800,2,1995,OldTown,\n5,1500,1000,1,2005,Ames,180000\n"
        ));
        let loaded = load_csv(file.path()).unwrap();
        assert_eq!(loaded.rows_read, 2);
        assert_eq!(loaded.dataset.len(), 1);
        assert_eq!(loaded.row_errors.len(), 1);
        assert_eq!(loaded.row_errors[0].line, 2);
    }

    #[test]
    fn rejects_csv_missing_a_required_column() {
        let file = write_csv("OverallQual,SalePrice\n7,250000\n");
        let err = load_csv(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn split_counts_match_the_canonical_scenario() {
        let data = Dataset {
            records: vec![RawRecord::default(); 1460],
            targets: (0..1460).map(|i| i as f64).collect(),
        };
        let (train, test) = train_test_split(&data, 0.2, 42).unwrap();
        assert_eq!(train.len(), 1168);
        assert_eq!(test.len(), 292);
    }

    #[test]
    fn split_is_deterministic_and_disjoint() {
        let data = Dataset {
            records: vec![RawRecord::default(); 50],
            targets: (0..50).map(|i| i as f64).collect(),
        };
        let (train_a, test_a) = train_test_split(&data, 0.2, 7).unwrap();
        let (train_b, test_b) = train_test_split(&data, 0.2, 7).unwrap();
        assert_eq!(train_a.targets, train_b.targets);
        assert_eq!(test_a.targets, test_b.targets);

        let mut all: Vec<f64> = train_a.targets.iter().chain(&test_a.targets).copied().collect();
        all.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(all, data.targets);
    }

    #[test]
    fn split_rejects_degenerate_ratios() {
        let data = Dataset {
            records: vec![RawRecord::default(); 10],
            targets: vec![0.0; 10],
        };
        assert!(train_test_split(&data, 0.0, 1).is_err());
        assert!(train_test_split(&data, 1.0, 1).is_err());
    }
}
