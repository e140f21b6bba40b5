//! Topology setup, ESP32 ingest and collector summaries.

mod common;

use chrono::Duration;
use predmaint_core::sensor::{DEFAULT_SENSOR_NAMES, SENSOR_HUMIDITY, SENSOR_TEMP, SENSOR_VIBRATION};
use predmaint_core::simulator::Esp32Simulator;
use predmaint_core::thresholds::{default_rules, ViolationKind};
use predmaint_db::repositories::{AssetRepo, SensorRepo, StatsRepo};
use predmaint_pipeline::collector::{
    load, load_json_file, process_records, scan_thresholds, sensor_stats, sensor_summary_report,
};
use predmaint_pipeline::simulate::save_records;
use predmaint_pipeline::topology::ensure_default_topology;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sqlx::SqlitePool;

use common::{base_ts, seed_series, setup};

fn simulated(n: usize) -> Esp32Simulator<StdRng> {
    let mut sim = Esp32Simulator::new(StdRng::seed_from_u64(42));
    for i in 0..n {
        sim.sample(base_ts() + Duration::seconds(5 * i as i64));
    }
    sim
}

// ---------------------------------------------------------------------------
// Topology
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_topology_is_idempotent(pool: SqlitePool) {
    let first = ensure_default_topology(&pool).await.unwrap();
    let second = ensure_default_topology(&pool).await.unwrap();

    assert_eq!(first.asset_id, second.asset_id);
    assert_eq!(first.sensor_ids, second.sensor_ids);
    assert_eq!(first.sensor_ids.len(), 4);
    assert_eq!(AssetRepo::count(&pool).await.unwrap(), 1);
    assert_eq!(SensorRepo::list(&pool).await.unwrap().len(), 4);
    for name in DEFAULT_SENSOR_NAMES {
        assert!(first.sensor_id(name).is_ok(), "{name} missing");
    }
}

// ---------------------------------------------------------------------------
// Ingest
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_process_and_load_records(pool: SqlitePool) {
    let topology = setup(&pool).await;
    let sim = simulated(5);

    let readings = process_records(sim.records(), &topology).unwrap();
    assert_eq!(readings.len(), 20);

    let vibration_id = topology.sensor_id(SENSOR_VIBRATION).unwrap();
    let first_vibration = readings.iter().find(|r| r.sensor_id == vibration_id).unwrap();
    assert_eq!(first_vibration.value, sim.records()[0].vibration_magnitude());

    assert_eq!(load(&pool, &readings).await.unwrap(), 20);
    let stats = StatsRepo::database_stats(&pool).await.unwrap();
    assert_eq!(stats.readings, 20);
    assert_eq!(stats.last_reading_at, Some(sim.records()[4].datetime));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_records_round_trip_through_json_file(pool: SqlitePool) {
    let topology = setup(&pool).await;
    let sim = simulated(3);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sensor_data.json");

    save_records(&path, sim.records()).await.unwrap();
    let records = load_json_file(&path).await.unwrap();
    assert_eq!(records.len(), 3);

    let readings = process_records(&records, &topology).unwrap();
    assert_eq!(load(&pool, &readings).await.unwrap(), 12);
}

#[tokio::test]
async fn test_missing_json_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_json_file(&dir.path().join("absent.json")).await.unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}

// ---------------------------------------------------------------------------
// Summaries and threshold scans
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sensor_stats(pool: SqlitePool) {
    let topology = setup(&pool).await;
    seed_series(&pool, &topology, SENSOR_TEMP, base_ts(), &[20.0, 22.0, 24.0, 26.0]).await;

    let stats = sensor_stats(&pool, SENSOR_TEMP, 100).await.unwrap().unwrap();
    assert_eq!(stats.count, 4);
    assert_eq!(stats.mean, 23.0);
    assert_eq!(stats.min, 20.0);
    assert_eq!(stats.max, 26.0);
    assert_eq!(stats.last_reading, base_ts() + Duration::minutes(15));

    // Only the newest two readings.
    let recent = sensor_stats(&pool, SENSOR_TEMP, 2).await.unwrap().unwrap();
    assert_eq!(recent.mean, 25.0);

    assert!(sensor_stats(&pool, SENSOR_HUMIDITY, 100).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_summary_report_skips_empty_sensors(pool: SqlitePool) {
    let topology = setup(&pool).await;
    seed_series(&pool, &topology, SENSOR_TEMP, base_ts(), &[20.0, 21.0]).await;
    seed_series(&pool, &topology, SENSOR_HUMIDITY, base_ts(), &[55.0]).await;

    let report = sensor_summary_report(&pool, 1000).await.unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report[SENSOR_TEMP].count, 2);
    assert_eq!(report[SENSOR_HUMIDITY].count, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_scan_thresholds_covers_recent_window(pool: SqlitePool) {
    let topology = setup(&pool).await;
    seed_series(&pool, &topology, SENSOR_TEMP, base_ts(), &[60.0, 30.0, 36.0, 34.0]).await;

    let all = scan_thresholds(&pool, &default_rules(), 100).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|a| a.kind == ViolationKind::AboveMaximum));

    // The 60.0 reading is the oldest and falls outside a window of three.
    let recent = scan_thresholds(&pool, &default_rules(), 3).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].value, 36.0);
}
