//! Ingest of ESP32 records and per-sensor summaries over stored readings.

use std::collections::BTreeMap;
use std::path::Path;

use predmaint_core::sensor::{SENSOR_HUMIDITY, SENSOR_LIGHT, SENSOR_TEMP, SENSOR_VIBRATION};
use predmaint_core::simulator::Esp32Record;
use predmaint_core::stats::Summary;
use predmaint_core::thresholds::{evaluate, Anomaly, ObservedValue, ThresholdRule};
use predmaint_core::types::Timestamp;
use predmaint_db::models::reading::CreateReading;
use predmaint_db::repositories::{ReadingRepo, SensorRepo};
use predmaint_db::DbPool;
use serde::Serialize;

use crate::error::PipelineResult;
use crate::report;
use crate::topology::Topology;

/// Readings per sensor used by [`sensor_summary_report`] by default.
pub const DEFAULT_SUMMARY_LIMIT: i64 = 1000;

/// Readings per sensor scanned by [`scan_thresholds`] by default.
pub const DEFAULT_SCAN_LIMIT: i64 = 100;

/// Split each record into one reading per sensor.
///
/// Vibration is stored as the magnitude of the acceleration vector.
pub fn process_records(
    records: &[Esp32Record],
    topology: &Topology,
) -> PipelineResult<Vec<CreateReading>> {
    let temp = topology.sensor_id(SENSOR_TEMP)?;
    let humidity = topology.sensor_id(SENSOR_HUMIDITY)?;
    let light = topology.sensor_id(SENSOR_LIGHT)?;
    let vibration = topology.sensor_id(SENSOR_VIBRATION)?;

    let mut readings = Vec::with_capacity(records.len() * 4);
    for r in records {
        let ts = r.datetime;
        readings.push(CreateReading {
            sensor_id: temp,
            ts,
            value: r.temperature,
        });
        readings.push(CreateReading {
            sensor_id: humidity,
            ts,
            value: r.humidity,
        });
        readings.push(CreateReading {
            sensor_id: light,
            ts,
            value: r.luminosity,
        });
        readings.push(CreateReading {
            sensor_id: vibration,
            ts,
            value: r.vibration_magnitude(),
        });
    }
    Ok(readings)
}

/// Store readings in one transaction; returns the number inserted.
pub async fn load(pool: &DbPool, readings: &[CreateReading]) -> PipelineResult<u64> {
    let inserted = ReadingRepo::create_batch(pool, readings).await?;
    tracing::info!(inserted, "Readings loaded");
    Ok(inserted)
}

/// Read records previously written by the simulator.
pub async fn load_json_file(path: &Path) -> PipelineResult<Vec<Esp32Record>> {
    let records: Vec<Esp32Record> = report::read_json(path).await?;
    tracing::info!(path = %path.display(), records = records.len(), "Records read");
    Ok(records)
}

/// Summary statistics of a sensor's most recent readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub last_reading: Timestamp,
}

/// Statistics over the newest `limit` readings of one sensor.
///
/// `None` when the sensor has no readings.
pub async fn sensor_stats(
    pool: &DbPool,
    sensor_name: &str,
    limit: i64,
) -> PipelineResult<Option<SensorStats>> {
    let points = ReadingRepo::recent_by_sensor_name(pool, sensor_name, limit).await?;
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let (Some(summary), Some(last_reading)) = (
        Summary::from_values(&values),
        points.iter().map(|p| p.ts).max(),
    ) else {
        return Ok(None);
    };

    Ok(Some(SensorStats {
        count: summary.count,
        mean: summary.mean,
        std: summary.std,
        min: summary.min,
        max: summary.max,
        last_reading,
    }))
}

/// Statistics for every sensor that has readings, keyed by sensor name.
pub async fn sensor_summary_report(
    pool: &DbPool,
    limit: i64,
) -> PipelineResult<BTreeMap<String, SensorStats>> {
    let mut report = BTreeMap::new();
    for sensor in SensorRepo::list(pool).await? {
        if let Some(stats) = sensor_stats(pool, &sensor.name, limit).await? {
            report.insert(sensor.name, stats);
        }
    }
    Ok(report)
}

/// Check the newest `limit` readings of each ruled sensor against its rule.
///
/// Nothing is persisted; see [`crate::anomaly::detect_latest`] for that.
pub async fn scan_thresholds(
    pool: &DbPool,
    rules: &[ThresholdRule],
    limit: i64,
) -> PipelineResult<Vec<Anomaly>> {
    let mut observations = Vec::new();
    for rule in rules {
        let points = ReadingRepo::recent_by_sensor_name(pool, &rule.sensor_name, limit).await?;
        observations.extend(points.into_iter().map(|p| ObservedValue {
            sensor_name: rule.sensor_name.clone(),
            value: p.value,
            ts: p.ts,
        }));
    }
    let anomalies = evaluate(&observations, rules);
    tracing::debug!(observations = observations.len(), anomalies = anomalies.len(), "Threshold scan");
    Ok(anomalies)
}
