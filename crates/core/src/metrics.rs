//! Regression error metrics.

use crate::error::CoreError;

fn check_lengths(actual: &[f64], predicted: &[f64]) -> Result<(), CoreError> {
    if actual.is_empty() {
        return Err(CoreError::Validation(
            "metrics need at least one sample".to_string(),
        ));
    }
    if actual.len() != predicted.len() {
        return Err(CoreError::Validation(format!(
            "actual ({}) and predicted ({}) differ in length",
            actual.len(),
            predicted.len()
        )));
    }
    Ok(())
}

/// Mean absolute error.
pub fn mae(actual: &[f64], predicted: &[f64]) -> Result<f64, CoreError> {
    check_lengths(actual, predicted)?;
    let sum: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()).sum();
    Ok(sum / actual.len() as f64)
}

/// Root mean squared error.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64, CoreError> {
    check_lengths(actual, predicted)?;
    let sum: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    Ok((sum / actual.len() as f64).sqrt())
}

/// Coefficient of determination.
///
/// When the actual values have no variance the score is 1.0 for a perfect
/// prediction and 0.0 otherwise.
pub fn r2(actual: &[f64], predicted: &[f64]) -> Result<f64, CoreError> {
    check_lengths(actual, predicted)?;
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}
