//! Batch orchestration for the predictive-maintenance pipeline.
//!
//! Every step runs sequentially against the SQLite store: topology setup,
//! ESP32 simulation and ingest, synthetic history loading, model training,
//! prediction, anomaly detection and reporting. [`run::run_pipeline`] chains
//! them end to end.

pub mod anomaly;
pub mod collector;
pub mod config;
pub mod error;
pub mod loader;
pub mod predictor;
pub mod report;
pub mod run;
pub mod simulate;
pub mod topology;
pub mod trainer;

use predmaint_db::DbPool;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};

/// Connect to the configured database, verify it and apply migrations.
pub async fn open_database(config: &PipelineConfig) -> PipelineResult<DbPool> {
    let pool = predmaint_db::create_pool(&config.database_url, config.max_connections).await?;
    tracing::debug!(url = %config.database_url, "Database connection pool created");

    predmaint_db::health_check(&pool).await?;
    predmaint_db::run_migrations(&pool).await?;
    tracing::info!(url = %config.database_url, "Database ready");

    Ok(pool)
}
