//! Reading models (append-only time series).

use predmaint_core::features::Point;
use predmaint_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `reading` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reading {
    pub id: DbId,
    pub sensor_id: DbId,
    pub ts: Timestamp,
    pub value: f64,
    pub created_at: Timestamp,
}

/// DTO for inserting a reading.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CreateReading {
    pub sensor_id: DbId,
    pub ts: Timestamp,
    pub value: f64,
}

/// A bare `(ts, value)` pair for one sensor.
#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct ReadingPoint {
    pub ts: Timestamp,
    pub value: f64,
}

impl From<ReadingPoint> for Point {
    fn from(p: ReadingPoint) -> Self {
        Point {
            ts: p.ts,
            value: p.value,
        }
    }
}

/// The most recent reading of a sensor.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LatestReading {
    pub sensor_id: DbId,
    pub sensor_name: String,
    pub sensor_type: String,
    pub unit: String,
    pub ts: Timestamp,
    pub value: f64,
}

/// A reading joined with its sensor and asset, as the dashboard charts it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReadingWithSensor {
    pub id: DbId,
    pub ts: Timestamp,
    pub value: f64,
    pub sensor_name: String,
    pub sensor_type: String,
    pub unit: String,
    pub asset_name: String,
}
