//! Handlers for sensor listing, per-sensor readings and summaries.

use axum::extract::State;
use axum::Json;
use predmaint_core::error::CoreError;
use predmaint_core::stats::Summary;
use predmaint_core::types::Timestamp;
use predmaint_db::models::reading::ReadingPoint;
use predmaint_db::models::sensor::Sensor;
use predmaint_db::repositories::{ReadingRepo, SensorRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::{ApiPath, ApiQuery};
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_READINGS_LIMIT: i64 = 100;

/// Readings summarised by [`sensor_summary`].
const SUMMARY_WINDOW: i64 = 100;

/// Statistics over a sensor's most recent readings.
#[derive(Debug, Serialize)]
pub struct SensorSummary {
    pub sensor: Sensor,
    /// `None` when the sensor has no readings yet.
    pub stats: Option<Summary>,
    pub last_value: Option<f64>,
    pub last_reading_at: Option<Timestamp>,
}

async fn find_sensor(state: &AppState, name: &str) -> AppResult<Sensor> {
    SensorRepo::find_by_name(&state.pool, name)
        .await?
        .ok_or_else(|| CoreError::UnknownSensor(name.to_string()).into())
}

/// GET /api/v1/sensors
pub async fn list_sensors(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Sensor>>>> {
    let sensors = SensorRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: sensors }))
}

/// GET /api/v1/sensors/{name}/readings?limit=
///
/// Newest readings first.
pub async fn sensor_readings(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
    ApiQuery(params): ApiQuery<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<ReadingPoint>>>> {
    let limit = params.resolve(DEFAULT_READINGS_LIMIT, state.config.max_query_limit)?;
    find_sensor(&state, &name).await?;
    let readings = ReadingRepo::recent_by_sensor_name(&state.pool, &name, limit).await?;
    Ok(Json(DataResponse { data: readings }))
}

/// GET /api/v1/sensors/{name}/summary
pub async fn sensor_summary(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> AppResult<Json<DataResponse<SensorSummary>>> {
    let sensor = find_sensor(&state, &name).await?;
    let readings = ReadingRepo::recent_by_sensor_name(&state.pool, &name, SUMMARY_WINDOW).await?;
    let values: Vec<f64> = readings.iter().map(|r| r.value).collect();
    let latest = readings.first();

    Ok(Json(DataResponse {
        data: SensorSummary {
            sensor,
            stats: Summary::from_values(&values),
            last_value: latest.map(|r| r.value),
            last_reading_at: latest.map(|r| r.ts),
        },
    }))
}
