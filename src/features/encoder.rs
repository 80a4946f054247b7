//! Raw record -> encoded row, aligned to a frozen schema.
//!
//! The transform direction is total: it never fails for any record. An unseen
//! neighborhood simply produces an all-zero indicator block, which reproduces
//! the reference-category semantics of drop-first one-hot encoding. A training
//! category that never recurs at serving time yields a column that is always
//! zero; that is expected, not an error.

use crate::domain::RawRecord;
use crate::error::AppError;
use crate::features::Schema;

/// Fit a schema from the training split.
///
/// The category set (and therefore the indicator column list) is derived from
/// these records only; evaluation data must never be passed here.
pub fn fit_schema(records: &[RawRecord]) -> Result<Schema, AppError> {
    if records.is_empty() {
        return Err(AppError::no_data("Cannot fit a schema on an empty training set."));
    }
    Schema::from_categories(records.iter().map(|r| r.neighborhood.clone()))
}

/// Encode one record against a frozen schema.
///
/// The output length always equals `schema.len()` and the column order always
/// matches `schema.columns`.
pub fn encode(record: &RawRecord, schema: &Schema) -> Vec<f64> {
    let mut row = Vec::with_capacity(schema.len());
    row.extend_from_slice(&record.numeric_values());
    for category in schema.indicator_categories() {
        row.push(if record.neighborhood == category { 1.0 } else { 0.0 });
    }
    row
}

/// Encode a batch of records into a row-major matrix.
pub fn encode_all(records: &[RawRecord], schema: &Schema) -> Vec<Vec<f64>> {
    records.iter().map(|r| encode(r, schema)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(neighborhood: &str) -> RawRecord {
        RawRecord {
            neighborhood: neighborhood.to_string(),
            ..RawRecord::default()
        }
    }

    fn schema() -> Schema {
        fit_schema(&[record("Ames"), record("OldTown"), record("CollgCr")]).unwrap()
    }

    #[test]
    fn known_category_sets_exactly_one_indicator() {
        let schema = schema();
        let row = encode(&record("OldTown"), &schema);
        assert_eq!(row.len(), schema.len());

        let indicators = &row[5..];
        assert_eq!(indicators.iter().filter(|&&v| v == 1.0).count(), 1);
        // Column order follows the schema: CollgCr then OldTown.
        assert_eq!(indicators, &[0.0, 1.0]);
    }

    #[test]
    fn reference_category_encodes_all_zero() {
        let schema = schema();
        let row = encode(&record("Ames"), &schema);
        assert!(row[5..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn unknown_category_encodes_all_zero_without_error() {
        let schema = schema();
        let row = encode(&record("Timberline"), &schema);
        assert_eq!(row.len(), schema.len());
        assert!(row[5..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn numeric_fields_copy_through_in_canonical_order() {
        let schema = schema();
        let rec = RawRecord {
            overall_qual: 8.0,
            gr_liv_area: 2400.0,
            total_bsmt_sf: 900.0,
            garage_cars: 3.0,
            year_built: 1995.0,
            neighborhood: "Ames".to_string(),
        };
        let row = encode(&rec, &schema);
        assert_eq!(&row[..5], &[8.0, 2400.0, 900.0, 3.0, 1995.0]);
    }

    #[test]
    fn missing_field_defaults_match_literal_default_record() {
        let schema = schema();
        let from_empty =
            RawRecord::from_json(&serde_json::json!({})).unwrap();
        assert_eq!(encode(&from_empty, &schema), encode(&RawRecord::default(), &schema));
    }

    #[test]
    fn fit_schema_rejects_empty_training_set() {
        assert!(fit_schema(&[]).is_err());
    }
}
