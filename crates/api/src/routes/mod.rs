pub mod alerts;
pub mod health;
pub mod predictions;
pub mod readings;
pub mod sensors;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /stats                             database counts
///
/// /sensors                           list
/// /sensors/{name}/readings           newest readings (?limit=)
/// /sensors/{name}/summary            statistics over recent readings
///
/// /readings                          readings in a time window (?hours=)
/// /readings/latest                   latest reading per sensor
///
/// /alerts                            recent alerts (?limit=)
/// /alerts/active                     unacknowledged alerts
/// /alerts/counts                     counts per severity
/// /alerts/{id}/acknowledge           acknowledge (POST)
///
/// /predictions                       recent predictions (?limit=)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::stats::database_stats))
        .nest("/sensors", sensors::router())
        .nest("/readings", readings::router())
        .nest("/alerts", alerts::router())
        .nest("/predictions", predictions::router())
}
