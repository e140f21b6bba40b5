//! Repository for the `asset` table.

use chrono::Utc;
use predmaint_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::asset::{Asset, CreateAsset};

/// Column list for `asset` queries.
const COLUMNS: &str = "id, name, location, created_at, updated_at";

/// Provides CRUD operations for assets.
pub struct AssetRepo;

impl AssetRepo {
    /// Insert a new asset, returning the created row.
    pub async fn create(pool: &SqlitePool, input: &CreateAsset) -> Result<Asset, sqlx::Error> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO asset (name, location, created_at, updated_at) \
             VALUES (?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(&input.name)
            .bind(input.location.as_deref())
            .bind(now)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    /// Find an asset by its internal ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM asset WHERE id = ?");
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an asset by its unique name.
    pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM asset WHERE name = ?");
        sqlx::query_as::<_, Asset>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all assets ordered by name.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM asset ORDER BY name");
        sqlx::query_as::<_, Asset>(&query).fetch_all(pool).await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM asset")
            .fetch_one(pool)
            .await
    }
}
