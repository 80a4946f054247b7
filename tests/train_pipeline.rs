//! End-to-end pipeline tests: train on synthetic data, persist the bundle,
//! reload it, and predict through the serving chain.

use house_prices::app::pipeline::run_train;
use house_prices::data::{generate_synthetic, train_test_split};
use house_prices::domain::{ForestParams, ModelSpec, RawRecord, TrainConfig};
use house_prices::io::load_artifacts;
use house_prices::serve::ServingContext;

fn config(dir: &std::path::Path, model: ModelSpec) -> TrainConfig {
    TrainConfig {
        csv_path: None,
        offline: true,
        seed: 42,
        test_ratio: 0.2,
        synthetic_rows: 300,
        model,
        forest: ForestParams {
            n_trees: 10,
            ..ForestParams::default()
        },
        model_dir: dir.to_path_buf(),
    }
}

fn sample_records() -> Vec<RawRecord> {
    let mut records = vec![
        RawRecord::default(),
        RawRecord {
            overall_qual: 9.0,
            gr_liv_area: 3200.0,
            total_bsmt_sf: 1400.0,
            garage_cars: 3.0,
            year_built: 2008.0,
            neighborhood: "NoRidge".to_string(),
        },
        RawRecord {
            overall_qual: 3.0,
            gr_liv_area: 900.0,
            total_bsmt_sf: 0.0,
            garage_cars: 0.0,
            year_built: 1925.0,
            neighborhood: "Nowhere Special".to_string(),
        },
    ];
    // One record per known synthetic neighborhood too.
    for n in house_prices::domain::SYNTHETIC_NEIGHBORHOODS {
        records.push(RawRecord {
            neighborhood: n.to_string(),
            ..RawRecord::default()
        });
    }
    records
}

#[test]
fn reloaded_bundle_reproduces_predictions() {
    for model in [ModelSpec::Forest, ModelSpec::Linear] {
        let dir = tempfile::tempdir().unwrap();
        let output = run_train(&config(dir.path(), model)).unwrap();

        let before = ServingContext::new(output.artifacts.clone());
        let after = ServingContext::new(load_artifacts(dir.path()).unwrap());

        for record in sample_records() {
            let a = before.predict_record(&record).unwrap();
            let b = after.predict_record(&record).unwrap();
            assert!(
                (a.price - b.price).abs() < 1e-9,
                "{model:?}: pre-persist {} vs reloaded {}",
                a.price,
                b.price
            );
            assert_eq!(a.formatted, b.formatted);
        }
    }
}

#[test]
fn retraining_with_the_same_seed_is_reproducible() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let out_a = run_train(&config(dir_a.path(), ModelSpec::Forest)).unwrap();
    let out_b = run_train(&config(dir_b.path(), ModelSpec::Forest)).unwrap();

    assert_eq!(out_a.artifacts.schema, out_b.artifacts.schema);
    assert_eq!(out_a.artifacts.scaler, out_b.artifacts.scaler);

    let ctx_a = ServingContext::new(out_a.artifacts);
    let ctx_b = ServingContext::new(out_b.artifacts);
    for record in sample_records() {
        let a = ctx_a.predict_record(&record).unwrap();
        let b = ctx_b.predict_record(&record).unwrap();
        assert_eq!(a.price, b.price);
    }
}

#[test]
fn canonical_scenario_splits_1460_rows_into_1168_and_292() {
    let data = generate_synthetic(1460, 42).unwrap();
    let (train, test) = train_test_split(&data, 0.2, 42).unwrap();
    assert_eq!(train.len(), 1168);
    assert_eq!(test.len(), 292);
}

#[test]
fn constant_category_never_yields_nan_predictions() {
    // Every row shares one neighborhood, so after drop-first encoding the
    // schema has no indicator columns at all; scaling and prediction must
    // still be finite.
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), ModelSpec::Linear);
    cfg.synthetic_rows = 120;

    let mut data = generate_synthetic(cfg.synthetic_rows, cfg.seed).unwrap();
    for rec in &mut data.records {
        rec.neighborhood = "Ames".to_string();
    }

    let (train, _) = train_test_split(&data, 0.2, cfg.seed).unwrap();
    let schema = house_prices::features::fit_schema(&train.records).unwrap();
    assert_eq!(schema.len(), 5, "single category leaves numeric columns only");

    let x = house_prices::features::encode_all(&train.records, &schema);
    let scaler = house_prices::features::StandardScaler::fit(&x).unwrap();
    for row in scaler.transform_all(&x) {
        assert!(row.iter().all(|v| v.is_finite()), "NaN/Inf in scaled row {row:?}");
    }
}

#[test]
fn missing_artifacts_fail_cleanly_at_load() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_artifacts(dir.path()).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("missing"), "{err}");
}
