//! Shared helpers for pipeline integration tests.

#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use predmaint_core::types::Timestamp;
use predmaint_db::models::reading::CreateReading;
use predmaint_db::repositories::ReadingRepo;
use predmaint_pipeline::topology::{ensure_default_topology, Topology};
use sqlx::SqlitePool;

pub fn base_ts() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

pub async fn setup(pool: &SqlitePool) -> Topology {
    ensure_default_topology(pool).await.unwrap()
}

/// Store `values` for `sensor_name` five minutes apart starting at `start`.
pub async fn seed_series(
    pool: &SqlitePool,
    topology: &Topology,
    sensor_name: &str,
    start: Timestamp,
    values: &[f64],
) {
    let sensor_id = topology.sensor_id(sensor_name).unwrap();
    let readings: Vec<CreateReading> = values
        .iter()
        .enumerate()
        .map(|(i, v)| CreateReading {
            sensor_id,
            ts: start + Duration::minutes(5 * i as i64),
            value: *v,
        })
        .collect();
    ReadingRepo::create_batch(pool, &readings).await.unwrap();
}

/// `0.0, 1.0, ..., (n - 1) as f64`.
pub fn ramp(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}
