//! Repository for the `sensor` table.

use chrono::Utc;
use predmaint_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::sensor::{CreateSensor, Sensor};

/// Column list for `sensor` queries.
const COLUMNS: &str = "\
    id, asset_id, name, type, unit, min_value, max_value, \
    created_at, updated_at";

/// Provides CRUD operations for sensors.
pub struct SensorRepo;

impl SensorRepo {
    /// Insert a new sensor, returning the created row.
    ///
    /// Fails with a unique violation on `uq_sensor_name` if the name is taken.
    pub async fn create(pool: &SqlitePool, input: &CreateSensor) -> Result<Sensor, sqlx::Error> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO sensor \
                (asset_id, name, type, unit, min_value, max_value, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sensor>(&query)
            .bind(input.asset_id)
            .bind(&input.name)
            .bind(&input.sensor_type)
            .bind(&input.unit)
            .bind(input.min_value)
            .bind(input.max_value)
            .bind(now)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Sensor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sensor WHERE id = ?");
        sqlx::query_as::<_, Sensor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Sensor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sensor WHERE name = ?");
        sqlx::query_as::<_, Sensor>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Resolve a sensor name to its ID.
    pub async fn id_by_name(pool: &SqlitePool, name: &str) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM sensor WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all sensors ordered by name.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Sensor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sensor ORDER BY name");
        sqlx::query_as::<_, Sensor>(&query).fetch_all(pool).await
    }

    /// List the sensors attached to one asset.
    pub async fn list_for_asset(
        pool: &SqlitePool,
        asset_id: DbId,
    ) -> Result<Vec<Sensor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sensor WHERE asset_id = ? ORDER BY name");
        sqlx::query_as::<_, Sensor>(&query)
            .bind(asset_id)
            .fetch_all(pool)
            .await
    }
}
