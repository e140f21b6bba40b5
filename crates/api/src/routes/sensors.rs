use axum::routing::get;
use axum::Router;

use crate::handlers::sensors;
use crate::state::AppState;

/// Routes mounted at `/sensors`.
///
/// ```text
/// GET /                 -> list_sensors
/// GET /{name}/readings  -> sensor_readings
/// GET /{name}/summary   -> sensor_summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sensors::list_sensors))
        .route("/{name}/readings", get(sensors::sensor_readings))
        .route("/{name}/summary", get(sensors::sensor_summary))
}
