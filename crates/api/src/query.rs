//! Query parameter types shared across handler modules.

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// `?limit=` for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

impl LimitParams {
    /// The requested limit, or `default`; must lie in `1..=max`.
    pub fn resolve(&self, default: i64, max: i64) -> AppResult<i64> {
        let limit = self.limit.unwrap_or(default);
        if !(1..=max).contains(&limit) {
            return Err(AppError::BadRequest(format!(
                "limit must be between 1 and {max}"
            )));
        }
        Ok(limit)
    }
}

/// `?hours=` for time-window endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct HoursParams {
    pub hours: Option<i64>,
}
