//! Handlers for alert listing and acknowledgement.

use axum::extract::State;
use axum::Json;
use predmaint_core::error::CoreError;
use predmaint_core::types::DbId;
use predmaint_db::models::alert::{Alert, AlertWithSensor, SeverityCount};
use predmaint_db::repositories::AlertRepo;

use crate::error::AppResult;
use crate::extract::{ApiPath, ApiQuery};
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_ALERTS_LIMIT: i64 = 50;

/// GET /api/v1/alerts?limit=
pub async fn list_alerts(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<AlertWithSensor>>>> {
    let limit = params.resolve(DEFAULT_ALERTS_LIMIT, state.config.max_query_limit)?;
    let alerts = AlertRepo::list_recent(&state.pool, limit).await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// GET /api/v1/alerts/active
pub async fn active_alerts(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<AlertWithSensor>>>> {
    let alerts = AlertRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// GET /api/v1/alerts/counts
pub async fn alert_counts(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<SeverityCount>>>> {
    let counts = AlertRepo::counts_by_severity(&state.pool).await?;
    Ok(Json(DataResponse { data: counts }))
}

/// POST /api/v1/alerts/{id}/acknowledge
pub async fn acknowledge_alert(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<DataResponse<Alert>>> {
    let alert = AlertRepo::acknowledge(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Alert", id })?;
    tracing::info!(alert_id = id, "Alert acknowledged");
    Ok(Json(DataResponse { data: alert }))
}
