use axum::extract::State;
use axum::Json;
use predmaint_db::models::stats::DatabaseStats;
use predmaint_db::repositories::StatsRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/stats
pub async fn database_stats(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DatabaseStats>>> {
    let stats = StatsRepo::database_stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}
