//! Sensor models.

use predmaint_core::sensor::SensorSpec;
use predmaint_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `sensor` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sensor {
    pub id: DbId,
    pub asset_id: DbId,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub sensor_type: String,
    pub unit: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a sensor.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSensor {
    pub asset_id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub sensor_type: String,
    pub unit: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

impl CreateSensor {
    /// Build the insert DTO for a catalog sensor under `asset_id`.
    pub fn from_spec(asset_id: DbId, spec: &SensorSpec) -> Self {
        Self {
            asset_id,
            name: spec.name.to_string(),
            sensor_type: spec.kind.as_str().to_string(),
            unit: spec.unit.to_string(),
            min_value: Some(spec.min_value),
            max_value: Some(spec.max_value),
        }
    }
}
