//! Model store, next-value prediction, residual checks and reports.

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use predmaint_core::error::CoreError;
use predmaint_core::sensor::{SENSOR_HUMIDITY, SENSOR_TEMP};
use predmaint_core::thresholds::AlertSeverity;
use predmaint_db::models::prediction::CreatePrediction;
use predmaint_db::repositories::PredictionRepo;
use predmaint_pipeline::predictor::{
    ModelStore, Predictor, SensorReportEntry, DEFAULT_RESIDUAL_THRESHOLD, SEQUENCE_STEP_MINUTES,
};
use predmaint_pipeline::topology::Topology;
use predmaint_pipeline::trainer::{train_linear, DEFAULT_TEST_SIZE};
use predmaint_pipeline::PipelineError;
use sqlx::SqlitePool;
use tempfile::TempDir;

use common::{base_ts, ramp, seed_series, setup};

/// Seed `S_TEMP` with a 0..n ramp and train a model on it.
async fn trained(pool: &SqlitePool, topology: &Topology, n: usize) -> (Predictor, TempDir) {
    seed_series(pool, topology, SENSOR_TEMP, base_ts(), &ramp(n)).await;
    let dir = tempfile::tempdir().unwrap();
    let (_, saved) = train_linear(pool, dir.path(), SENSOR_TEMP, DEFAULT_TEST_SIZE)
        .await
        .unwrap();
    let mut store = ModelStore::new();
    store.insert(saved);
    (Predictor::new(pool.clone(), store, "v1.0"), dir)
}

// ---------------------------------------------------------------------------
// Model store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_load_dir_missing_directory_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::load_dir(&dir.path().join("absent")).await.unwrap();
    assert!(store.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_load_dir_skips_unreadable_files(pool: SqlitePool) {
    let topology = setup(&pool).await;
    seed_series(&pool, &topology, SENSOR_TEMP, base_ts(), &ramp(30)).await;
    let dir = tempfile::tempdir().unwrap();
    train_linear(&pool, dir.path(), SENSOR_TEMP, DEFAULT_TEST_SIZE)
        .await
        .unwrap();
    std::fs::write(dir.path().join("S_HUMIDITY_linear_model.json"), b"not json").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

    let store = ModelStore::load_dir(dir.path()).await.unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.sensor_names().collect::<Vec<_>>(), vec![SENSOR_TEMP]);
    assert_eq!(store.get(SENSOR_TEMP).unwrap().key(), "S_TEMP_linear");
    assert_matches!(store.get(SENSOR_HUMIDITY), Err(PipelineError::ModelNotFound(_)));
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_predict_next_is_stored(pool: SqlitePool) {
    let topology = setup(&pool).await;
    let (predictor, _dir) = trained(&pool, &topology, 30).await;

    let outcome = predictor.predict_next(SENSOR_TEMP).await.unwrap();
    assert!((outcome.predicted_value - 30.0).abs() < 1e-6, "{outcome:?}");
    assert_eq!(outcome.model_used, "S_TEMP_linear");
    assert_eq!(outcome.target_ts, base_ts() + Duration::minutes(5 * 30));
    assert!((0.1..=0.95).contains(&outcome.confidence));

    let stored = PredictionRepo::list_recent(&pool, 10).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].sensor_name, SENSOR_TEMP);
    assert_eq!(stored[0].model_version.as_deref(), Some("v1.0"));
    assert!((stored[0].predicted_value - outcome.predicted_value).abs() < 1e-9);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_predict_next_without_model(pool: SqlitePool) {
    let topology = setup(&pool).await;
    let (predictor, _dir) = trained(&pool, &topology, 30).await;

    let err = predictor.predict_next(SENSOR_HUMIDITY).await.unwrap_err();
    assert_matches!(err, PipelineError::ModelNotFound(ref s) if s == SENSOR_HUMIDITY);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_predict_sequence(pool: SqlitePool) {
    let topology = setup(&pool).await;
    let (predictor, _dir) = trained(&pool, &topology, 30).await;

    let steps = predictor.predict_sequence(SENSOR_TEMP, 3).await.unwrap();
    assert_eq!(steps.len(), 3);
    let last_ts = base_ts() + Duration::minutes(5 * 29);
    for (i, step) in steps.iter().enumerate() {
        assert_eq!(step.step, i + 1);
        assert_eq!(
            step.timestamp,
            last_ts + Duration::minutes(SEQUENCE_STEP_MINUTES * (i as i64 + 1))
        );
        assert!((step.predicted_value - (30.0 + i as f64)).abs() < 1e-6, "{step:?}");
    }
    assert!(PredictionRepo::list_recent(&pool, 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_predict_sequence_validates_steps(pool: SqlitePool) {
    let topology = setup(&pool).await;
    let (predictor, _dir) = trained(&pool, &topology, 30).await;

    for steps in [0, 289] {
        let err = predictor.predict_sequence(SENSOR_TEMP, steps).await.unwrap_err();
        assert_matches!(err, PipelineError::Core(CoreError::Validation(_)));
    }
}

// ---------------------------------------------------------------------------
// Residual anomalies and accuracy
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_residual_quiet_on_expected_reading(pool: SqlitePool) {
    let topology = setup(&pool).await;
    let (predictor, _dir) = trained(&pool, &topology, 30).await;

    let anomaly = predictor
        .detect_residual_anomaly(SENSOR_TEMP, DEFAULT_RESIDUAL_THRESHOLD)
        .await
        .unwrap();
    assert!(anomaly.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_residual_flags_outlier(pool: SqlitePool) {
    let topology = setup(&pool).await;
    let (predictor, _dir) = trained(&pool, &topology, 30).await;
    seed_series(
        &pool,
        &topology,
        SENSOR_TEMP,
        base_ts() + Duration::minutes(5 * 30),
        &[100.0],
    )
    .await;

    let anomaly = predictor
        .detect_residual_anomaly(SENSOR_TEMP, DEFAULT_RESIDUAL_THRESHOLD)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(anomaly.actual_value, 100.0);
    assert!((anomaly.predicted_value - 30.0).abs() < 1e-6);
    assert!((anomaly.error - 70.0).abs() < 1e-6);
    // Window of the last 20 readings: 11..=29 and 100, sample std sqrt(350).
    assert!((anomaly.normalized_error - 70.0 / 350f64.sqrt()).abs() < 1e-6);
    assert_eq!(anomaly.severity, AlertSeverity::Medium);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_residual_needs_history(pool: SqlitePool) {
    let topology = setup(&pool).await;
    let (predictor, _dir) = trained(&pool, &topology, 30).await;
    let mut saved = predictor.store().get(SENSOR_TEMP).unwrap().clone();
    saved.sensor_name = SENSOR_HUMIDITY.to_string();
    let mut store = ModelStore::new();
    store.insert(saved);
    seed_series(&pool, &topology, SENSOR_HUMIDITY, base_ts(), &[50.0, 51.0, 52.0]).await;

    let predictor = Predictor::new(pool.clone(), store, "v1.0");
    let err = predictor
        .detect_residual_anomaly(SENSOR_HUMIDITY, DEFAULT_RESIDUAL_THRESHOLD)
        .await
        .unwrap_err();
    assert_matches!(err, PipelineError::Core(CoreError::InsufficientData { rows: 3, .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_prediction_accuracy(pool: SqlitePool) {
    let topology = setup(&pool).await;
    let (predictor, _dir) = trained(&pool, &topology, 30).await;

    // Readings from 2024 are far from predictions made now.
    predictor.predict_next(SENSOR_TEMP).await.unwrap();
    assert!(predictor
        .prediction_accuracy(SENSOR_TEMP, 24)
        .await
        .unwrap()
        .is_none());

    let now = Utc::now();
    seed_series(&pool, &topology, SENSOR_TEMP, now - Duration::minutes(2), &[40.0]).await;
    let sensor_id = topology.sensor_id(SENSOR_TEMP).unwrap();
    PredictionRepo::create(
        &pool,
        &CreatePrediction {
            sensor_id,
            predicted_value: 43.0,
            confidence: Some(0.8),
            model_version: Some("v1.0".to_string()),
            created_at: now - Duration::hours(48),
        },
    )
    .await
    .unwrap();

    let summary = predictor
        .prediction_accuracy(SENSOR_TEMP, 24)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.total_predictions, 1);
    assert!((summary.mean_error - (40.0 - 30.0)).abs() < 1e-6);
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_prediction_report_isolates_failures(pool: SqlitePool) {
    let topology = setup(&pool).await;
    let (predictor, _dir) = trained(&pool, &topology, 40).await;

    let report = predictor
        .prediction_report(&[SENSOR_TEMP, SENSOR_HUMIDITY])
        .await;
    assert_eq!(report.sensors.len(), 2);

    let SensorReportEntry::Ok(temp) = &report.sensors[SENSOR_TEMP] else {
        panic!("expected a report for {SENSOR_TEMP}");
    };
    assert_eq!(temp.sequence_predictions.len(), 5);
    assert!(temp.anomaly.is_none());
    assert!(temp.recent_performance.is_some());
    assert_matches!(&report.sensors[SENSOR_HUMIDITY], SensorReportEntry::Failed { .. });

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["sensors"][SENSOR_TEMP]["current_prediction"]["predicted_value"].is_number());
    assert!(json["sensors"][SENSOR_HUMIDITY]["error"].is_string());
}
