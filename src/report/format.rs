//! Formatted terminal output for training runs.

use crate::app::pipeline::TrainOutput;
use crate::domain::{EvalMetrics, TrainConfig, ORIGINAL_FEATURES};

/// Format a price as dollars with thousands separators, e.g. `$187,654.32`.
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u128;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{frac:02}")
}

/// Format the full training summary: data provenance, split sizes, schema
/// shape, and per-split metrics.
pub fn format_train_summary(output: &TrainOutput, config: &TrainConfig) -> String {
    let mut out = String::new();

    out.push_str("=== hp - House Price Model Training ===\n");
    out.push_str(&format!("Algorithm: {}\n", config.model.display_name()));
    out.push_str(&format!("Data: {}\n", output.source.describe()));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={} imputed-fields={}\n",
        output.rows_read,
        output.n_train + output.n_test,
        output.row_errors.len(),
        output.imputed_fields,
    ));
    out.push_str(&format!(
        "Split: train={} test={} (ratio={:.2}, seed={})\n",
        output.n_train, output.n_test, config.test_ratio, config.seed
    ));
    out.push_str(&format!(
        "Features: {} -> {} encoded columns (reference category '{}')\n",
        ORIGINAL_FEATURES.len(),
        output.artifacts.schema.len(),
        output.artifacts.schema.reference_category,
    ));

    out.push_str("\nTraining set:\n");
    out.push_str(&format_metrics(&output.train_metrics));
    out.push_str("\nTest set:\n");
    out.push_str(&format_metrics(&output.test_metrics));

    out.push_str(&format!(
        "\nArtifacts written to '{}'.\n",
        config.model_dir.display()
    ));

    for err in output.row_errors.iter().take(10) {
        out.push_str(&format!("  skipped line {}: {}\n", err.line, err.message));
    }
    if output.row_errors.len() > 10 {
        out.push_str(&format!(
            "  ... and {} more skipped rows\n",
            output.row_errors.len() - 10
        ));
    }

    out
}

fn format_metrics(m: &EvalMetrics) -> String {
    format!(
        "  MAE:  {}\n  MSE:  {:.2}\n  RMSE: {}\n  R2:   {:.4}\n",
        format_currency(m.mae),
        m.mse,
        format_currency(m.rmse),
        m.r2
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.5), "$999.50");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(187654.321), "$187,654.32");
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
    }

    #[test]
    fn currency_handles_negatives() {
        assert_eq!(format_currency(-1500.0), "-$1,500.00");
    }
}
