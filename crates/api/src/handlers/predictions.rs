use axum::extract::State;
use axum::Json;
use predmaint_db::models::prediction::PredictionWithSensor;
use predmaint_db::repositories::PredictionRepo;

use crate::error::AppResult;
use crate::extract::ApiQuery;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_PREDICTIONS_LIMIT: i64 = 10;

/// GET /api/v1/predictions?limit=
pub async fn list_predictions(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<PredictionWithSensor>>>> {
    let limit = params.resolve(DEFAULT_PREDICTIONS_LIMIT, state.config.max_query_limit)?;
    let predictions = PredictionRepo::list_recent(&state.pool, limit).await?;
    Ok(Json(DataResponse { data: predictions }))
}
