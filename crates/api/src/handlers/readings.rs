use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use predmaint_db::models::reading::{LatestReading, ReadingWithSensor};
use predmaint_db::repositories::ReadingRepo;

use crate::error::{AppError, AppResult};
use crate::extract::ApiQuery;
use crate::query::HoursParams;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_WINDOW_HOURS: i64 = 24;
/// Upper bound on rows returned by [`readings_window`].
const MAX_WINDOW_ROWS: i64 = 10_000;

/// GET /api/v1/readings?hours=
///
/// Readings of every sensor from the last `hours` hours (default 24), newest first.
pub async fn readings_window(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<HoursParams>,
) -> AppResult<Json<DataResponse<Vec<ReadingWithSensor>>>> {
    let hours = params.hours.unwrap_or(DEFAULT_WINDOW_HOURS);
    if !(1..=168).contains(&hours) {
        return Err(AppError::BadRequest(
            "hours must be between 1 and 168".to_string(),
        ));
    }
    let cutoff = Utc::now() - Duration::hours(hours);
    let readings = ReadingRepo::since(&state.pool, cutoff, MAX_WINDOW_ROWS).await?;
    Ok(Json(DataResponse { data: readings }))
}

/// GET /api/v1/readings/latest
pub async fn latest_readings(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<LatestReading>>>> {
    let latest = ReadingRepo::latest_per_sensor(&state.pool).await?;
    Ok(Json(DataResponse { data: latest }))
}
