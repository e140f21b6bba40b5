//! Repository for the `reading` table (append-only time series).

use chrono::Utc;
use predmaint_core::types::{DbId, Timestamp};
use sqlx::SqlitePool;

use crate::models::reading::{
    CreateReading, LatestReading, Reading, ReadingPoint, ReadingWithSensor,
};

/// Column list for `reading` SELECT queries.
const COLUMNS: &str = "id, sensor_id, ts, value, created_at";

/// Rows per multi-row INSERT; keeps each statement well under SQLite's
/// bound-parameter limit.
const BATCH_CHUNK: usize = 500;

/// Provides query operations for sensor readings.
pub struct ReadingRepo;

impl ReadingRepo {
    /// Insert a single reading.
    pub async fn create(pool: &SqlitePool, input: &CreateReading) -> Result<Reading, sqlx::Error> {
        let query = format!(
            "INSERT INTO reading (sensor_id, ts, value, created_at) \
             VALUES (?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reading>(&query)
            .bind(input.sensor_id)
            .bind(input.ts)
            .bind(input.value)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Batch-insert readings inside one transaction.
    ///
    /// Either every reading is stored or none is. Returns the number of rows
    /// inserted.
    pub async fn create_batch(
        pool: &SqlitePool,
        readings: &[CreateReading],
    ) -> Result<u64, sqlx::Error> {
        if readings.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut tx = pool.begin().await?;
        let mut inserted = 0;

        for chunk in readings.chunks(BATCH_CHUNK) {
            let mut query =
                String::from("INSERT INTO reading (sensor_id, ts, value, created_at) VALUES ");
            for i in 0..chunk.len() {
                if i > 0 {
                    query.push_str(", ");
                }
                query.push_str("(?, ?, ?, ?)");
            }

            let mut q = sqlx::query(&query);
            for r in chunk {
                q = q.bind(r.sensor_id).bind(r.ts).bind(r.value).bind(now);
            }
            inserted += q.execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// The newest `limit` readings of a sensor, newest first.
    pub async fn recent_for_sensor(
        pool: &SqlitePool,
        sensor_id: DbId,
        limit: i64,
    ) -> Result<Vec<Reading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reading \
             WHERE sensor_id = ? \
             ORDER BY ts DESC, id DESC \
             LIMIT ?"
        );
        sqlx::query_as::<_, Reading>(&query)
            .bind(sensor_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// The newest `limit` values of a sensor looked up by name, newest first.
    pub async fn recent_by_sensor_name(
        pool: &SqlitePool,
        sensor_name: &str,
        limit: i64,
    ) -> Result<Vec<ReadingPoint>, sqlx::Error> {
        sqlx::query_as::<_, ReadingPoint>(
            "SELECT r.ts, r.value \
             FROM reading r \
             JOIN sensor s ON s.id = r.sensor_id \
             WHERE s.name = ? \
             ORDER BY r.ts DESC, r.id DESC \
             LIMIT ?",
        )
        .bind(sensor_name)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// The latest reading of every sensor that has one.
    pub async fn latest_per_sensor(pool: &SqlitePool) -> Result<Vec<LatestReading>, sqlx::Error> {
        sqlx::query_as::<_, LatestReading>(
            "SELECT s.id AS sensor_id, s.name AS sensor_name, s.type AS sensor_type, \
                    s.unit, r.ts, r.value \
             FROM sensor s \
             JOIN reading r ON r.id = ( \
                 SELECT r2.id FROM reading r2 \
                 WHERE r2.sensor_id = s.id \
                 ORDER BY r2.ts DESC, r2.id DESC \
                 LIMIT 1) \
             ORDER BY s.name",
        )
        .fetch_all(pool)
        .await
    }

    /// Readings at or after `cutoff` joined with sensor and asset, newest first.
    pub async fn since(
        pool: &SqlitePool,
        cutoff: Timestamp,
        limit: i64,
    ) -> Result<Vec<ReadingWithSensor>, sqlx::Error> {
        sqlx::query_as::<_, ReadingWithSensor>(
            "SELECT r.id, r.ts, r.value, \
                    s.name AS sensor_name, s.type AS sensor_type, s.unit, \
                    a.name AS asset_name \
             FROM reading r \
             JOIN sensor s ON s.id = r.sensor_id \
             JOIN asset a ON a.id = s.asset_id \
             WHERE r.ts >= ? \
             ORDER BY r.ts DESC, r.id DESC \
             LIMIT ?",
        )
        .bind(cutoff)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// A sensor's full series in time order, optionally from `since` onwards.
    pub async fn series_for_sensor(
        pool: &SqlitePool,
        sensor_name: &str,
        since: Option<Timestamp>,
    ) -> Result<Vec<ReadingPoint>, sqlx::Error> {
        sqlx::query_as::<_, ReadingPoint>(
            "SELECT r.ts, r.value \
             FROM reading r \
             JOIN sensor s ON s.id = r.sensor_id \
             WHERE s.name = ? AND (? IS NULL OR r.ts >= ?) \
             ORDER BY r.ts ASC, r.id ASC",
        )
        .bind(sensor_name)
        .bind(since)
        .bind(since)
        .fetch_all(pool)
        .await
    }
}
