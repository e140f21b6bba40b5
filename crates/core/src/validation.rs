//! Shared range validation helpers.
//!
//! Used by the simulator, synthetic generator and trainer to reject
//! nonsensical parameters before any work is done.

use crate::error::CoreError;

/// Validate that a fraction lies strictly between 0.0 and 1.0.
///
/// Returns a `CoreError::Validation` naming the field if out of range.
pub fn validate_open_fraction(value: f64, name: &str) -> Result<(), CoreError> {
    if !(value > 0.0 && value < 1.0) {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0.0 and 1.0 (exclusive), got {value}"
        )));
    }
    Ok(())
}

/// Validate that an integer parameter lies within `[min, max]`.
pub fn validate_count_range(value: i64, min: i64, max: i64, name: &str) -> Result<(), CoreError> {
    if value < min || value > max {
        return Err(CoreError::Validation(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}
