use axum::routing::get;
use axum::Router;

use crate::handlers::readings;
use crate::state::AppState;

/// Routes mounted at `/readings`.
///
/// ```text
/// GET /        -> readings_window
/// GET /latest  -> latest_readings
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(readings::readings_window))
        .route("/latest", get(readings::latest_readings))
}
