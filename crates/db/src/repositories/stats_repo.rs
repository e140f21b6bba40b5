//! Aggregate counters across all tables.

use predmaint_core::types::Timestamp;
use sqlx::SqlitePool;

use crate::models::stats::DatabaseStats;

/// Read-only database-wide statistics.
pub struct StatsRepo;

impl StatsRepo {
    /// Count rows per table and find the newest reading.
    pub async fn database_stats(pool: &SqlitePool) -> Result<DatabaseStats, sqlx::Error> {
        let (assets, sensors, readings, alerts, active_alerts, predictions): (
            i64,
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            "SELECT \
                (SELECT COUNT(*) FROM asset), \
                (SELECT COUNT(*) FROM sensor), \
                (SELECT COUNT(*) FROM reading), \
                (SELECT COUNT(*) FROM alert), \
                (SELECT COUNT(*) FROM alert WHERE acknowledged = 0), \
                (SELECT COUNT(*) FROM prediction)",
        )
        .fetch_one(pool)
        .await?;

        let last_reading_at: Option<Timestamp> =
            sqlx::query_scalar("SELECT ts FROM reading ORDER BY ts DESC LIMIT 1")
                .fetch_optional(pool)
                .await?;

        Ok(DatabaseStats {
            assets,
            sensors,
            readings,
            alerts,
            active_alerts,
            predictions,
            last_reading_at,
        })
    }
}
