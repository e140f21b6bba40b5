//! Repository for the `alert` table.

use chrono::Utc;
use predmaint_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::alert::{Alert, AlertWithSensor, CreateAlert, SeverityCount};

/// Column list for `alert` queries.
const COLUMNS: &str = "\
    id, sensor_id, alert_type, threshold_value, actual_value, message, \
    severity, acknowledged, created_at";

/// Column list for alert queries joined with `sensor s` and `asset a`.
const JOINED_COLUMNS: &str = "\
    al.id, al.sensor_id, s.name AS sensor_name, a.name AS asset_name, \
    al.alert_type, al.threshold_value, al.actual_value, al.message, \
    al.severity, al.acknowledged, al.created_at";

/// Provides CRUD operations for alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Insert a new, unacknowledged alert.
    pub async fn create(pool: &SqlitePool, input: &CreateAlert) -> Result<Alert, sqlx::Error> {
        let query = format!(
            "INSERT INTO alert \
                (sensor_id, alert_type, threshold_value, actual_value, message, \
                 severity, acknowledged, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, 0, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(input.sensor_id)
            .bind(&input.alert_type)
            .bind(input.threshold_value)
            .bind(input.actual_value)
            .bind(input.message.as_deref())
            .bind(input.severity.as_str())
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Unacknowledged alerts, newest first.
    pub async fn list_active(pool: &SqlitePool) -> Result<Vec<AlertWithSensor>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM alert al \
             JOIN sensor s ON s.id = al.sensor_id \
             JOIN asset a ON a.id = s.asset_id \
             WHERE al.acknowledged = 0 \
             ORDER BY al.created_at DESC, al.id DESC"
        );
        sqlx::query_as::<_, AlertWithSensor>(&query)
            .fetch_all(pool)
            .await
    }

    /// The newest `limit` alerts regardless of state.
    pub async fn list_recent(
        pool: &SqlitePool,
        limit: i64,
    ) -> Result<Vec<AlertWithSensor>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM alert al \
             JOIN sensor s ON s.id = al.sensor_id \
             JOIN asset a ON a.id = s.asset_id \
             ORDER BY al.created_at DESC, al.id DESC \
             LIMIT ?"
        );
        sqlx::query_as::<_, AlertWithSensor>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Mark an alert as acknowledged.
    ///
    /// Returns `None` if no alert with that ID exists. Acknowledging twice is
    /// not an error.
    pub async fn acknowledge(pool: &SqlitePool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!("UPDATE alert SET acknowledged = 1 WHERE id = ? RETURNING {COLUMNS}");
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Alert totals grouped by severity (only severities that occur).
    pub async fn counts_by_severity(pool: &SqlitePool) -> Result<Vec<SeverityCount>, sqlx::Error> {
        sqlx::query_as::<_, SeverityCount>(
            "SELECT severity, COUNT(*) AS count FROM alert GROUP BY severity ORDER BY severity",
        )
        .fetch_all(pool)
        .await
    }
}
