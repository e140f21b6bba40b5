//! Repository for the `prediction` table.

use predmaint_core::types::Timestamp;
use sqlx::SqlitePool;

use crate::models::prediction::{CreatePrediction, Prediction, PredictionWithSensor};

/// Column list for `prediction` queries.
const COLUMNS: &str = "id, sensor_id, predicted_value, confidence, model_version, created_at";

/// Provides query operations for stored predictions.
pub struct PredictionRepo;

impl PredictionRepo {
    pub async fn create(
        pool: &SqlitePool,
        input: &CreatePrediction,
    ) -> Result<Prediction, sqlx::Error> {
        let query = format!(
            "INSERT INTO prediction \
                (sensor_id, predicted_value, confidence, model_version, created_at) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prediction>(&query)
            .bind(input.sensor_id)
            .bind(input.predicted_value)
            .bind(input.confidence)
            .bind(input.model_version.as_deref())
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// The newest `limit` predictions with their sensor names.
    pub async fn list_recent(
        pool: &SqlitePool,
        limit: i64,
    ) -> Result<Vec<PredictionWithSensor>, sqlx::Error> {
        sqlx::query_as::<_, PredictionWithSensor>(
            "SELECT p.id, p.sensor_id, s.name AS sensor_name, p.predicted_value, \
                    p.confidence, p.model_version, p.created_at \
             FROM prediction p \
             JOIN sensor s ON s.id = p.sensor_id \
             ORDER BY p.created_at DESC, p.id DESC \
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Predictions of one sensor made at or after `since`, oldest first.
    pub async fn for_sensor_since(
        pool: &SqlitePool,
        sensor_name: &str,
        since: Timestamp,
    ) -> Result<Vec<Prediction>, sqlx::Error> {
        sqlx::query_as::<_, Prediction>(
            "SELECT p.id, p.sensor_id, p.predicted_value, p.confidence, \
                    p.model_version, p.created_at \
             FROM prediction p \
             JOIN sensor s ON s.id = p.sensor_id \
             WHERE s.name = ? AND p.created_at >= ? \
             ORDER BY p.created_at ASC, p.id ASC",
        )
        .bind(sensor_name)
        .bind(since)
        .fetch_all(pool)
        .await
    }
}
