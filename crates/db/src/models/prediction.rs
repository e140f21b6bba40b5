//! Prediction models.

use predmaint_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `prediction` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Prediction {
    pub id: DbId,
    pub sensor_id: DbId,
    pub predicted_value: f64,
    pub confidence: Option<f64>,
    pub model_version: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting a prediction.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrediction {
    pub sensor_id: DbId,
    pub predicted_value: f64,
    pub confidence: Option<f64>,
    pub model_version: Option<String>,
    pub created_at: Timestamp,
}

/// A prediction joined with its sensor name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PredictionWithSensor {
    pub id: DbId,
    pub sensor_id: DbId,
    pub sensor_name: String,
    pub predicted_value: f64,
    pub confidence: Option<f64>,
    pub model_version: Option<String>,
    pub created_at: Timestamp,
}
