use axum::routing::{get, post};
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET  /                   -> list_alerts
/// GET  /active             -> active_alerts
/// GET  /counts             -> alert_counts
/// POST /{id}/acknowledge   -> acknowledge_alert
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alerts::list_alerts))
        .route("/active", get(alerts::active_alerts))
        .route("/counts", get(alerts::alert_counts))
        .route("/{id}/acknowledge", post(alerts::acknowledge_alert))
}
