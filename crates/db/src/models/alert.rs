//! Alert models.

use predmaint_core::thresholds::AlertSeverity;
use predmaint_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `alert` table.
///
/// `severity` holds the text of an [`AlertSeverity`]; the table's CHECK
/// constraint keeps it to the four known values.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    pub sensor_id: DbId,
    pub alert_type: String,
    pub threshold_value: Option<f64>,
    pub actual_value: Option<f64>,
    pub message: Option<String>,
    pub severity: String,
    pub acknowledged: bool,
    pub created_at: Timestamp,
}

/// DTO for inserting an alert.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAlert {
    pub sensor_id: DbId,
    pub alert_type: String,
    pub threshold_value: Option<f64>,
    pub actual_value: Option<f64>,
    pub message: Option<String>,
    pub severity: AlertSeverity,
}

/// An alert joined with its sensor and asset names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AlertWithSensor {
    pub id: DbId,
    pub sensor_id: DbId,
    pub sensor_name: String,
    pub asset_name: String,
    pub alert_type: String,
    pub threshold_value: Option<f64>,
    pub actual_value: Option<f64>,
    pub message: Option<String>,
    pub severity: String,
    pub acknowledged: bool,
    pub created_at: Timestamp,
}

/// Number of alerts per severity.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeverityCount {
    pub severity: String,
    pub count: i64,
}
