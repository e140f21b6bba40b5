//! Back-testing of stored predictions against the readings that followed.

use chrono::Duration;
use serde::Serialize;

use crate::stats::{mean, sample_std};
use crate::types::Timestamp;

/// Default maximum distance between a prediction and the reading it is scored against.
pub const DEFAULT_MATCH_TOLERANCE_MINUTES: i64 = 30;

/// Aggregate error of a sensor's predictions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracySummary {
    pub total_predictions: usize,
    pub mean_error: f64,
    pub std_error: f64,
    pub max_error: f64,
    /// Share of predictions whose error is below `mean_error`.
    pub accuracy_rate: f64,
}

/// Score `predictions` against the nearest reading in time.
///
/// Both slices hold `(timestamp, value)` pairs. Predictions without a reading
/// within `tolerance` are skipped; `None` when nothing could be matched.
pub fn prediction_accuracy(
    predictions: &[(Timestamp, f64)],
    readings: &[(Timestamp, f64)],
    tolerance: Duration,
) -> Option<AccuracySummary> {
    if predictions.is_empty() || readings.is_empty() {
        return None;
    }

    let errors: Vec<f64> = predictions
        .iter()
        .filter_map(|(pred_ts, predicted)| {
            let (gap, actual) = readings
                .iter()
                .map(|(ts, value)| ((*ts - *pred_ts).abs(), *value))
                .min_by_key(|(gap, _)| *gap)?;
            (gap < tolerance).then(|| (predicted - actual).abs())
        })
        .collect();

    if errors.is_empty() {
        return None;
    }

    let mean_error = mean(&errors);
    let below = errors.iter().filter(|e| **e < mean_error).count();

    Some(AccuracySummary {
        total_predictions: errors.len(),
        mean_error,
        std_error: sample_std(&errors),
        max_error: errors.iter().copied().fold(0.0, f64::max),
        accuracy_rate: below as f64 / errors.len() as f64,
    })
}
