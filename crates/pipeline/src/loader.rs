//! Demo data: synthetic history, sample alerts and predictions, demo report.

use std::collections::BTreeMap;

use chrono::Utc;
use predmaint_core::noise::gauss;
use predmaint_core::sensor::{
    DEFAULT_SENSOR_NAMES, SENSOR_HUMIDITY, SENSOR_TEMP, SENSOR_VIBRATION,
};
use predmaint_core::synthetic::{generate, SyntheticConfig};
use predmaint_core::thresholds::{AlertSeverity, ALERT_TYPE_THRESHOLD};
use predmaint_core::types::Timestamp;
use predmaint_db::models::alert::CreateAlert;
use predmaint_db::models::prediction::CreatePrediction;
use predmaint_db::models::reading::CreateReading;
use predmaint_db::models::stats::DatabaseStats;
use predmaint_db::repositories::{
    AlertRepo, PredictionRepo, ReadingRepo, SensorRepo, StatsRepo,
};
use predmaint_db::DbPool;
use rand::Rng;
use serde::Serialize;

use crate::collector::{sensor_stats, SensorStats};
use crate::error::PipelineResult;

/// Readings per sensor summarised in the demo report.
const DEMO_STATS_LIMIT: i64 = 100;
/// Predictions counted as "recent" in the demo report.
const DEMO_RECENT_PREDICTIONS: i64 = 10;

/// Relative standard deviation of the noise added to sample predictions.
const SAMPLE_PREDICTION_NOISE: f64 = 0.05;

/// Generate synthetic history from `start` and store it.
///
/// Series for sensors not present in the database are skipped with a
/// warning. Returns the number of readings inserted.
pub async fn load_synthetic<R: Rng + ?Sized>(
    pool: &DbPool,
    config: &SyntheticConfig,
    start: Timestamp,
    rng: &mut R,
) -> PipelineResult<u64> {
    let generated = generate(config, start, rng)?;
    tracing::info!(
        days = config.days,
        frequency_minutes = config.frequency_minutes,
        periods = generated.timestamps.len(),
        "Synthetic history generated",
    );

    let mut readings = Vec::with_capacity(generated.total_readings());
    for (sensor_name, values) in &generated.series {
        let Some(sensor_id) = SensorRepo::id_by_name(pool, sensor_name).await? else {
            tracing::warn!(sensor = sensor_name, "Sensor not found in database, skipping");
            continue;
        };
        readings.extend(
            generated
                .timestamps
                .iter()
                .zip(values)
                .map(|(ts, value)| CreateReading {
                    sensor_id,
                    ts: *ts,
                    value: *value,
                }),
        );
    }

    let inserted = ReadingRepo::create_batch(pool, &readings).await?;
    tracing::info!(inserted, "Synthetic readings loaded");
    Ok(inserted)
}

struct SampleAlert {
    sensor_name: &'static str,
    threshold: f64,
    actual: f64,
    message: &'static str,
    severity: AlertSeverity,
}

const SAMPLE_ALERTS: [SampleAlert; 3] = [
    SampleAlert {
        sensor_name: SENSOR_TEMP,
        threshold: 35.0,
        actual: 38.5,
        message: "Critical temperature detected - check the cooling system",
        severity: AlertSeverity::High,
    },
    SampleAlert {
        sensor_name: SENSOR_HUMIDITY,
        threshold: 80.0,
        actual: 85.2,
        message: "High humidity - check ventilation",
        severity: AlertSeverity::Medium,
    },
    SampleAlert {
        sensor_name: SENSOR_VIBRATION,
        threshold: 2000.0,
        actual: 2500.0,
        message: "Excessive vibration - check equipment alignment",
        severity: AlertSeverity::High,
    },
];

/// Insert the three fixed demo alerts for sensors that exist.
pub async fn create_sample_alerts(pool: &DbPool) -> PipelineResult<usize> {
    let mut created = 0;
    for sample in &SAMPLE_ALERTS {
        let Some(sensor_id) = SensorRepo::id_by_name(pool, sample.sensor_name).await? else {
            continue;
        };
        AlertRepo::create(
            pool,
            &CreateAlert {
                sensor_id,
                alert_type: ALERT_TYPE_THRESHOLD.to_string(),
                threshold_value: Some(sample.threshold),
                actual_value: Some(sample.actual),
                message: Some(sample.message.to_string()),
                severity: sample.severity,
            },
        )
        .await?;
        created += 1;
    }
    tracing::info!(created, "Sample alerts created");
    Ok(created)
}

/// Store one noisy "prediction" per sensor based on its latest reading.
///
/// Covers temperature, humidity and vibration; sensors without readings are
/// skipped.
pub async fn create_sample_predictions<R: Rng + ?Sized>(
    pool: &DbPool,
    rng: &mut R,
    model_version: &str,
) -> PipelineResult<usize> {
    let mut created = 0;
    for sensor_name in [SENSOR_TEMP, SENSOR_HUMIDITY, SENSOR_VIBRATION] {
        let Some(sensor_id) = SensorRepo::id_by_name(pool, sensor_name).await? else {
            continue;
        };
        let latest = ReadingRepo::recent_by_sensor_name(pool, sensor_name, 1).await?;
        let Some(base) = latest.first().map(|p| p.value) else {
            continue;
        };

        let predicted_value = base + gauss(rng, 0.0, base.abs() * SAMPLE_PREDICTION_NOISE);
        let confidence = rng.random_range(0.7..0.95);
        PredictionRepo::create(
            pool,
            &CreatePrediction {
                sensor_id,
                predicted_value,
                confidence: Some(confidence),
                model_version: Some(model_version.to_string()),
                created_at: Utc::now(),
            },
        )
        .await?;
        created += 1;
    }
    tracing::info!(created, "Sample predictions created");
    Ok(created)
}

/// Headline numbers of a [`DemoReport`].
#[derive(Debug, Clone, Serialize)]
pub struct DemoSummary {
    pub total_readings: i64,
    pub total_sensors: i64,
    pub total_assets: i64,
    pub active_alerts: usize,
}

/// Snapshot of the database after the demo data has been loaded.
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub timestamp: Timestamp,
    pub database_stats: DatabaseStats,
    pub sensor_stats: BTreeMap<String, SensorStats>,
    pub active_alerts_count: usize,
    pub recent_predictions_count: usize,
    pub summary: DemoSummary,
}

pub async fn demo_report(pool: &DbPool) -> PipelineResult<DemoReport> {
    let database_stats = StatsRepo::database_stats(pool).await?;

    let mut stats = BTreeMap::new();
    for sensor_name in DEFAULT_SENSOR_NAMES {
        match sensor_stats(pool, sensor_name, DEMO_STATS_LIMIT).await {
            Ok(Some(s)) => {
                stats.insert(sensor_name.to_string(), s);
            }
            Ok(None) => {}
            Err(e) => tracing::error!(sensor = sensor_name, error = %e, "Failed to read sensor stats"),
        }
    }

    let active_alerts = AlertRepo::list_active(pool).await?.len();
    let recent_predictions = PredictionRepo::list_recent(pool, DEMO_RECENT_PREDICTIONS)
        .await?
        .len();

    Ok(DemoReport {
        timestamp: Utc::now(),
        summary: DemoSummary {
            total_readings: database_stats.readings,
            total_sensors: database_stats.sensors,
            total_assets: database_stats.assets,
            active_alerts,
        },
        database_stats,
        sensor_stats: stats,
        active_alerts_count: active_alerts,
        recent_predictions_count: recent_predictions,
    })
}
