use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Unknown sensor: {0}")]
    UnknownSensor(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Insufficient data for {sensor}: {rows} rows, need at least {required}")]
    InsufficientData {
        sensor: String,
        rows: usize,
        required: usize,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
