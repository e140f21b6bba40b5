//! Integration tests for the dashboard data endpoints.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, build_test_app, get, post};
use predmaint_core::sensor::default_sensors;
use predmaint_core::thresholds::AlertSeverity;
use predmaint_core::types::{DbId, Timestamp};
use predmaint_db::models::alert::CreateAlert;
use predmaint_db::models::asset::CreateAsset;
use predmaint_db::models::prediction::CreatePrediction;
use predmaint_db::models::reading::CreateReading;
use predmaint_db::models::sensor::CreateSensor;
use predmaint_db::repositories::{AlertRepo, AssetRepo, PredictionRepo, ReadingRepo, SensorRepo};
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create one asset with the four default sensors; returns sensor ids in
/// catalog order (temperature, humidity, light, vibration).
async fn seed_topology(pool: &SqlitePool) -> Vec<DbId> {
    let asset = AssetRepo::create(
        pool,
        &CreateAsset {
            name: "Line 1".to_string(),
            location: None,
        },
    )
    .await
    .unwrap();

    let mut ids = Vec::new();
    for spec in default_sensors() {
        let sensor = SensorRepo::create(pool, &CreateSensor::from_spec(asset.id, &spec))
            .await
            .unwrap();
        ids.push(sensor.id);
    }
    ids
}

async fn seed_readings(pool: &SqlitePool, sensor_id: DbId, start: Timestamp, values: &[f64]) {
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

async fn seed_alert(pool: &SqlitePool, sensor_id: DbId, severity: AlertSeverity) -> DbId {
    AlertRepo::create(
        pool,
        &CreateAlert {
            sensor_id,
            alert_type: "threshold".to_string(),
            threshold_value: Some(35.0),
            actual_value: Some(38.5),
            message: Some("S_TEMP: value 38.50 exceeds threshold 35.00".to_string()),
            severity,
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Stats and sensors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn stats_reports_table_counts(pool: SqlitePool) {
    let ids = seed_topology(&pool).await;
    seed_readings(&pool, ids[0], Utc::now() - Duration::hours(1), &[21.0, 22.0]).await;

    let json = body_json(get(build_test_app(pool), "/api/v1/stats").await).await;
    assert_eq!(json["data"]["assets"], 1);
    assert_eq!(json["data"]["sensors"], 4);
    assert_eq!(json["data"]["readings"], 2);
    assert_eq!(json["data"]["active_alerts"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_sensors_returns_catalog(pool: SqlitePool) {
    seed_topology(&pool).await;

    let response = get(build_test_app(pool), "/api/v1/sensors").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let sensors = json["data"].as_array().unwrap();
    assert_eq!(sensors.len(), 4);
    assert!(sensors.iter().any(|s| s["name"] == "S_TEMP" && s["type"] == "temperature"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sensor_readings_newest_first_with_limit(pool: SqlitePool) {
    let ids = seed_topology(&pool).await;
    seed_readings(&pool, ids[0], Utc::now() - Duration::hours(1), &[20.0, 21.0, 22.0]).await;

    let json = body_json(get(build_test_app(pool), "/api/v1/sensors/S_TEMP/readings?limit=2").await).await;
    let readings = json["data"].as_array().unwrap();
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0]["value"], 22.0);
    assert_eq!(readings[1]["value"], 21.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sensor_readings_rejects_out_of_range_limit(pool: SqlitePool) {
    seed_topology(&pool).await;

    let response = get(build_test_app(pool), "/api/v1/sensors/S_TEMP/readings?limit=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_sensor_is_404(pool: SqlitePool) {
    seed_topology(&pool).await;

    let response = get(build_test_app(pool), "/api/v1/sensors/S_PRESSURE/summary").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert!(json["error"].as_str().unwrap().contains("S_PRESSURE"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sensor_summary_statistics(pool: SqlitePool) {
    let ids = seed_topology(&pool).await;
    let start = Utc::now() - Duration::hours(1);
    seed_readings(&pool, ids[1], start, &[50.0, 60.0, 70.0]).await;

    let json = body_json(get(build_test_app(pool.clone()), "/api/v1/sensors/S_HUMIDITY/summary").await).await;
    let data = &json["data"];
    assert_eq!(data["sensor"]["name"], "S_HUMIDITY");
    assert_eq!(data["stats"]["count"], 3);
    assert_eq!(data["stats"]["mean"], 60.0);
    assert_eq!(data["stats"]["min"], 50.0);
    assert_eq!(data["stats"]["max"], 70.0);
    assert_eq!(data["last_value"], 70.0);

    // A sensor without readings still has a summary, with no stats.
    let json = body_json(get(build_test_app(pool), "/api/v1/sensors/S_LIGHT/summary").await).await;
    assert!(json["data"]["stats"].is_null());
    assert!(json["data"]["last_value"].is_null());
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn readings_window_filters_by_hours(pool: SqlitePool) {
    let ids = seed_topology(&pool).await;
    seed_readings(&pool, ids[0], Utc::now() - Duration::hours(30), &[10.0]).await;
    seed_readings(&pool, ids[0], Utc::now() - Duration::hours(2), &[20.0, 21.0]).await;

    let json = body_json(get(build_test_app(pool.clone()), "/api/v1/readings").await).await;
    let readings = json["data"].as_array().unwrap();
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0]["sensor_name"], "S_TEMP");
    assert_eq!(readings[0]["asset_name"], "Line 1");

    let json = body_json(get(build_test_app(pool), "/api/v1/readings?hours=48").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn readings_window_validates_hours(pool: SqlitePool) {
    for uri in ["/api/v1/readings?hours=0", "/api/v1/readings?hours=169"] {
        let response = get(build_test_app(pool.clone()), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn latest_readings_one_per_sensor(pool: SqlitePool) {
    let ids = seed_topology(&pool).await;
    let start = Utc::now() - Duration::hours(1);
    seed_readings(&pool, ids[0], start, &[20.0, 25.0]).await;
    seed_readings(&pool, ids[3], start, &[1000.0]).await;

    let json = body_json(get(build_test_app(pool), "/api/v1/readings/latest").await).await;
    let latest = json["data"].as_array().unwrap();
    assert_eq!(latest.len(), 2);
    let temp = latest.iter().find(|r| r["sensor_name"] == "S_TEMP").unwrap();
    assert_eq!(temp["value"], 25.0);
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn alert_lifecycle(pool: SqlitePool) {
    let ids = seed_topology(&pool).await;
    let first = seed_alert(&pool, ids[0], AlertSeverity::High).await;
    seed_alert(&pool, ids[3], AlertSeverity::Medium).await;
    seed_alert(&pool, ids[3], AlertSeverity::High).await;

    let json = body_json(get(build_test_app(pool.clone()), "/api/v1/alerts/active").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);

    let response = post(
        build_test_app(pool.clone()),
        &format!("/api/v1/alerts/{first}/acknowledge"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], first);
    assert_eq!(json["data"]["acknowledged"], true);

    let json = body_json(get(build_test_app(pool.clone()), "/api/v1/alerts/active").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    // Acknowledged alerts still appear in the recent list.
    let json = body_json(get(build_test_app(pool.clone()), "/api/v1/alerts?limit=2").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    let json = body_json(get(build_test_app(pool.clone()), "/api/v1/alerts").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);

    let json = body_json(get(build_test_app(pool), "/api/v1/alerts/counts").await).await;
    let counts = json["data"].as_array().unwrap();
    let high = counts.iter().find(|c| c["severity"] == "high").unwrap();
    assert_eq!(high["count"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn acknowledge_missing_alert_is_404(pool: SqlitePool) {
    let response = post(build_test_app(pool), "/api/v1/alerts/999/acknowledge").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn predictions_default_limit(pool: SqlitePool) {
    let ids = seed_topology(&pool).await;
    let now = Utc::now();
    for i in 0..12 {
        PredictionRepo::create(
            &pool,
            &CreatePrediction {
                sensor_id: ids[0],
                predicted_value: 20.0 + f64::from(i),
                confidence: Some(0.8),
                model_version: Some("v1.0".to_string()),
                created_at: now - Duration::minutes(i64::from(i)),
            },
        )
        .await
        .unwrap();
    }

    let json = body_json(get(build_test_app(pool.clone()), "/api/v1/predictions").await).await;
    let predictions = json["data"].as_array().unwrap();
    assert_eq!(predictions.len(), 10);
    assert_eq!(predictions[0]["predicted_value"], 20.0);
    assert_eq!(predictions[0]["sensor_name"], "S_TEMP");

    let json = body_json(get(build_test_app(pool), "/api/v1/predictions?limit=3").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
}
