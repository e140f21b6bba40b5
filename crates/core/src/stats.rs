//! Descriptive statistics over reading values.

use serde::Serialize;

/// Lower clamp for a derived prediction confidence.
pub const MIN_CONFIDENCE: f64 = 0.1;
/// Upper clamp for a derived prediction confidence.
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Count, mean, sample standard deviation and range of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); 0.0 for fewer than two values.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// Summarise `values`. Returns `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mean = mean(values);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            count: values.len(),
            mean,
            std: sample_std(values),
            min,
            max,
        })
    }
}

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); 0.0 for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Confidence of a prediction derived from the dispersion of recent values:
/// `1 - std / mean`, clamped to `[MIN_CONFIDENCE, MAX_CONFIDENCE]`.
///
/// Fewer than two values, or a mean of (almost) zero, yield `MIN_CONFIDENCE`.
pub fn confidence_from_values(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return MIN_CONFIDENCE;
    }
    let m = mean(values);
    if m.abs() < f64::EPSILON {
        return MIN_CONFIDENCE;
    }
    let raw = 1.0 - sample_std(values) / m;
    if raw.is_nan() {
        return MIN_CONFIDENCE;
    }
    raw.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}
