use axum::routing::get;
use axum::Router;

use crate::handlers::predictions;
use crate::state::AppState;

/// Routes mounted at `/predictions`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(predictions::list_predictions))
}
