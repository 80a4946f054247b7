//! Regression evaluation metrics.

use crate::domain::EvalMetrics;
use crate::error::AppError;

/// Compute MAE, MSE, RMSE, and R² for one split.
///
/// R² is `1 - SS_res / SS_tot`; for a constant target (`SS_tot = 0`) it is
/// reported as 0 rather than dividing by zero.
pub fn evaluate(y_true: &[f64], y_pred: &[f64]) -> Result<EvalMetrics, AppError> {
    if y_true.is_empty() {
        return Err(AppError::no_data("Cannot evaluate on an empty split."));
    }
    if y_true.len() != y_pred.len() {
        return Err(AppError::internal(format!(
            "Prediction count {} disagrees with target count {}.",
            y_pred.len(),
            y_true.len()
        )));
    }

    let n = y_true.len() as f64;
    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    for (t, p) in y_true.iter().zip(y_pred) {
        let d = t - p;
        abs_sum += d.abs();
        sq_sum += d * d;
    }
    let mae = abs_sum / n;
    let mse = sq_sum / n;
    let rmse = mse.sqrt();

    let mean = y_true.iter().sum::<f64>() / n;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    let r2 = if ss_tot > 0.0 { 1.0 - sq_sum / ss_tot } else { 0.0 };

    Ok(EvalMetrics { mae, mse, rmse, r2 })
}
