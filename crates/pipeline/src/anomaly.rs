//! Persisting threshold violations and residual anomalies as alerts.

use predmaint_core::error::CoreError;
use predmaint_core::thresholds::{
    evaluate, Anomaly, ObservedValue, ThresholdRule, ALERT_TYPE_PREDICTION, ALERT_TYPE_THRESHOLD,
};
use predmaint_db::models::alert::{Alert, CreateAlert};
use predmaint_db::repositories::{AlertRepo, ReadingRepo, SensorRepo};
use predmaint_db::DbPool;

use crate::error::PipelineResult;
use crate::predictor::ResidualAnomaly;

/// Check the latest reading of every sensor and store an alert per violation.
pub async fn detect_latest(pool: &DbPool, rules: &[ThresholdRule]) -> PipelineResult<Vec<Anomaly>> {
    let latest = ReadingRepo::latest_per_sensor(pool).await?;
    let observations: Vec<ObservedValue> = latest
        .iter()
        .map(|r| ObservedValue {
            sensor_name: r.sensor_name.clone(),
            value: r.value,
            ts: r.ts,
        })
        .collect();

    let anomalies = evaluate(&observations, rules);
    for anomaly in &anomalies {
        let Some(reading) = latest.iter().find(|r| r.sensor_name == anomaly.sensor_name) else {
            continue;
        };
        AlertRepo::create(
            pool,
            &CreateAlert {
                sensor_id: reading.sensor_id,
                alert_type: ALERT_TYPE_THRESHOLD.to_string(),
                threshold_value: Some(anomaly.threshold),
                actual_value: Some(anomaly.value),
                message: Some(anomaly.message()),
                severity: anomaly.severity,
            },
        )
        .await?;
        tracing::warn!(
            sensor = %anomaly.sensor_name,
            value = anomaly.value,
            threshold = anomaly.threshold,
            severity = %anomaly.severity,
            "Threshold alert created",
        );
    }

    tracing::info!(sensors = latest.len(), anomalies = anomalies.len(), "Anomaly detection finished");
    Ok(anomalies)
}

/// Store a residual anomaly as a `prediction_residual` alert.
pub async fn record_residual_anomaly(
    pool: &DbPool,
    anomaly: &ResidualAnomaly,
) -> PipelineResult<Alert> {
    let sensor_id = SensorRepo::id_by_name(pool, &anomaly.sensor_name)
        .await?
        .ok_or_else(|| CoreError::UnknownSensor(anomaly.sensor_name.clone()))?;

    let alert = AlertRepo::create(
        pool,
        &CreateAlert {
            sensor_id,
            alert_type: ALERT_TYPE_PREDICTION.to_string(),
            threshold_value: Some(anomaly.predicted_value),
            actual_value: Some(anomaly.actual_value),
            message: Some(format!(
                "{}: reading {:.2} deviates from predicted {:.2} by {:.1} standard deviations",
                anomaly.sensor_name, anomaly.actual_value, anomaly.predicted_value, anomaly.normalized_error
            )),
            severity: anomaly.severity,
        },
    )
    .await?;

    tracing::warn!(
        sensor = %anomaly.sensor_name,
        alert_id = alert.id,
        normalized_error = anomaly.normalized_error,
        "Residual alert created",
    );
    Ok(alert)
}
