//! Next-value prediction, residual anomaly detection and prediction reports.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Duration, Timelike, Utc};
use predmaint_core::accuracy::{self, AccuracySummary, DEFAULT_MATCH_TOLERANCE_MINUTES};
use predmaint_core::error::CoreError;
use predmaint_core::features::{next_features, Point, HISTORY};
use predmaint_core::stats::{confidence_from_values, sample_std};
use predmaint_core::thresholds::{residual_severity, AlertSeverity};
use predmaint_core::types::Timestamp;
use predmaint_core::validation::validate_count_range;
use predmaint_db::models::prediction::CreatePrediction;
use predmaint_db::repositories::{PredictionRepo, ReadingRepo, SensorRepo};
use predmaint_db::DbPool;
use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};
use crate::report;
use crate::trainer::{self, Evaluation, SavedModel, DEFAULT_EVALUATION_LIMIT};

/// Readings fetched to build the next feature row.
const FEATURE_LOOKBACK: i64 = 5;
/// Readings used to derive a prediction's confidence.
const CONFIDENCE_WINDOW: i64 = 10;
/// Readings whose spread normalises a residual.
const RESIDUAL_WINDOW: i64 = 20;
/// Readings compared against stored predictions.
const ACCURACY_READINGS: i64 = 1000;
/// Spacing of sequence predictions.
pub const SEQUENCE_STEP_MINUTES: i64 = 5;
pub const MAX_SEQUENCE_STEPS: i64 = 288;
pub const DEFAULT_SEQUENCE_STEPS: i64 = 5;
pub const DEFAULT_RESIDUAL_THRESHOLD: f64 = 2.0;
pub const DEFAULT_ACCURACY_HOURS: i64 = 24;

/// Models available for prediction, keyed by sensor name.
#[derive(Debug, Clone, Default)]
pub struct ModelStore {
    models: BTreeMap<String, SavedModel>,
}

impl ModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, saved: SavedModel) {
        self.models.insert(saved.sensor_name.clone(), saved);
    }

    pub fn get(&self, sensor_name: &str) -> PipelineResult<&SavedModel> {
        self.models
            .get(sensor_name)
            .ok_or_else(|| PipelineError::ModelNotFound(sensor_name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn sensor_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Load every `*_model.json` file in `dir`.
    ///
    /// A missing directory yields an empty store. Files that cannot be read
    /// or parsed are skipped with a warning.
    pub async fn load_dir(dir: &Path) -> PipelineResult<Self> {
        let mut store = Self::new();
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(dir = %dir.display(), "Models directory not found");
                return Ok(store);
            }
            Err(e) => return Err(PipelineError::io(dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PipelineError::io(dir, e))?
        {
            let path = entry.path();
            let is_model = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with("_model.json"));
            if !is_model {
                continue;
            }
            match report::read_json::<SavedModel>(&path).await {
                Ok(saved) => {
                    tracing::debug!(sensor = %saved.sensor_name, path = %path.display(), "Model loaded");
                    store.insert(saved);
                }
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable model"),
            }
        }

        tracing::info!(models = store.len(), dir = %dir.display(), "Models loaded");
        Ok(store)
    }
}

/// A stored next-value prediction.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub sensor_name: String,
    pub predicted_value: f64,
    pub confidence: f64,
    pub model_used: String,
    /// Expected time of the predicted reading.
    pub target_ts: Timestamp,
    /// When the prediction was made.
    pub timestamp: Timestamp,
}

/// One step of a multi-step forecast.
#[derive(Debug, Clone, Serialize)]
pub struct SequenceStep {
    pub step: usize,
    pub predicted_value: f64,
    pub timestamp: Timestamp,
}

/// The latest reading deviates from what the model expected.
#[derive(Debug, Clone, Serialize)]
pub struct ResidualAnomaly {
    pub sensor_name: String,
    pub ts: Timestamp,
    pub actual_value: f64,
    pub predicted_value: f64,
    pub error: f64,
    /// `error` divided by the standard deviation of the recent window.
    pub normalized_error: f64,
    pub threshold: f64,
    pub severity: AlertSeverity,
}

/// Everything the prediction report holds for one sensor.
#[derive(Debug, Clone, Serialize)]
pub struct SensorPredictionReport {
    pub current_prediction: PredictionOutcome,
    pub sequence_predictions: Vec<SequenceStep>,
    pub anomaly: Option<ResidualAnomaly>,
    pub accuracy: Option<AccuracySummary>,
    pub recent_performance: Option<Evaluation>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SensorReportEntry {
    Ok(Box<SensorPredictionReport>),
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub timestamp: Timestamp,
    pub sensors: BTreeMap<String, SensorReportEntry>,
}

/// Runs stored models against the latest readings.
#[derive(Debug, Clone)]
pub struct Predictor {
    pool: DbPool,
    store: ModelStore,
    model_version: String,
}

impl Predictor {
    pub fn new(pool: DbPool, store: ModelStore, model_version: impl Into<String>) -> Self {
        Self {
            pool,
            store,
            model_version: model_version.into(),
        }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// The newest `limit` readings of a sensor, oldest first.
    async fn recent_points(&self, sensor_name: &str, limit: i64) -> PipelineResult<Vec<Point>> {
        let mut points: Vec<Point> = ReadingRepo::recent_by_sensor_name(&self.pool, sensor_name, limit)
            .await?
            .into_iter()
            .map(Point::from)
            .collect();
        points.reverse();
        Ok(points)
    }

    /// Predict the reading that follows the latest one and store it.
    ///
    /// The target time is the latest reading plus the most recent sampling
    /// gap. Confidence comes from the spread of the last readings.
    pub async fn predict_next(&self, sensor_name: &str) -> PipelineResult<PredictionOutcome> {
        let saved = self.store.get(sensor_name)?;
        let points = self.recent_points(sensor_name, FEATURE_LOOKBACK).await?;
        let target_ts = next_timestamp(&points).ok_or_else(|| insufficient(sensor_name, points.len()))?;
        let row = next_features(&points, target_ts)?;
        let predicted_value = saved.model.predict(&row);

        let window: Vec<f64> = ReadingRepo::recent_by_sensor_name(&self.pool, sensor_name, CONFIDENCE_WINDOW)
            .await?
            .iter()
            .map(|p| p.value)
            .collect();
        let confidence = confidence_from_values(&window);

        let sensor_id = SensorRepo::id_by_name(&self.pool, sensor_name)
            .await?
            .ok_or_else(|| CoreError::UnknownSensor(sensor_name.to_string()))?;
        let now = Utc::now();
        PredictionRepo::create(
            &self.pool,
            &CreatePrediction {
                sensor_id,
                predicted_value,
                confidence: Some(confidence),
                model_version: Some(self.model_version.clone()),
                created_at: now,
            },
        )
        .await?;

        tracing::info!(sensor = sensor_name, predicted_value, confidence, "Prediction stored");
        Ok(PredictionOutcome {
            sensor_name: sensor_name.to_string(),
            predicted_value,
            confidence,
            model_used: saved.key(),
            target_ts,
            timestamp: now,
        })
    }

    /// Forecast `steps` readings ahead, feeding each prediction back in.
    ///
    /// Steps are [`SEQUENCE_STEP_MINUTES`] apart starting after the latest
    /// reading. Nothing is stored.
    pub async fn predict_sequence(
        &self,
        sensor_name: &str,
        steps: i64,
    ) -> PipelineResult<Vec<SequenceStep>> {
        validate_count_range(steps, 1, MAX_SEQUENCE_STEPS, "steps")?;
        let saved = self.store.get(sensor_name)?;
        let points = self.recent_points(sensor_name, FEATURE_LOOKBACK).await?;
        let Some(last) = points.last() else {
            return Err(insufficient(sensor_name, 0));
        };

        let step = Duration::minutes(SEQUENCE_STEP_MINUTES);
        let mut ts = last.ts + step;
        let mut row = next_features(&points, ts)?;
        let mut out = Vec::with_capacity(steps as usize);
        for i in 1..=steps as usize {
            let predicted_value = saved.model.predict(&row);
            out.push(SequenceStep {
                step: i,
                predicted_value,
                timestamp: ts,
            });
            ts += step;
            row = row.roll_forward(predicted_value, ts.hour());
        }
        Ok(out)
    }

    /// Compare the latest reading with the model's prediction from the
    /// readings before it.
    ///
    /// The residual is normalised by the sample standard deviation of the
    /// last readings; `None` when it stays within `threshold` or the window
    /// has no spread.
    pub async fn detect_residual_anomaly(
        &self,
        sensor_name: &str,
        threshold: f64,
    ) -> PipelineResult<Option<ResidualAnomaly>> {
        let saved = self.store.get(sensor_name)?;
        let points = self.recent_points(sensor_name, RESIDUAL_WINDOW).await?;
        let Some((latest, history)) = points.split_last() else {
            return Err(insufficient(sensor_name, 0));
        };
        if history.len() < HISTORY {
            return Err(insufficient(sensor_name, points.len()));
        }

        let row = next_features(history, latest.ts)?;
        let predicted_value = saved.model.predict(&row);
        let error = (latest.value - predicted_value).abs();

        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let spread = sample_std(&values);
        if spread <= 0.0 {
            return Ok(None);
        }
        let normalized_error = error / spread;

        Ok(residual_severity(normalized_error, threshold).map(|severity| ResidualAnomaly {
            sensor_name: sensor_name.to_string(),
            ts: latest.ts,
            actual_value: latest.value,
            predicted_value,
            error,
            normalized_error,
            threshold,
            severity,
        }))
    }

    /// Score stored predictions from the last `hours_back` hours against the
    /// readings nearest to them.
    pub async fn prediction_accuracy(
        &self,
        sensor_name: &str,
        hours_back: i64,
    ) -> PipelineResult<Option<AccuracySummary>> {
        let since = Utc::now() - Duration::hours(hours_back);
        let predictions: Vec<(Timestamp, f64)> =
            PredictionRepo::for_sensor_since(&self.pool, sensor_name, since)
                .await?
                .iter()
                .map(|p| (p.created_at, p.predicted_value))
                .collect();
        let readings: Vec<(Timestamp, f64)> =
            ReadingRepo::recent_by_sensor_name(&self.pool, sensor_name, ACCURACY_READINGS)
                .await?
                .iter()
                .map(|p| (p.ts, p.value))
                .collect();

        Ok(accuracy::prediction_accuracy(
            &predictions,
            &readings,
            Duration::minutes(DEFAULT_MATCH_TOLERANCE_MINUTES),
        ))
    }

    async fn sensor_report(&self, sensor_name: &str) -> PipelineResult<SensorPredictionReport> {
        let current_prediction = self.predict_next(sensor_name).await?;
        let sequence_predictions = self
            .predict_sequence(sensor_name, DEFAULT_SEQUENCE_STEPS)
            .await?;
        let anomaly = self
            .detect_residual_anomaly(sensor_name, DEFAULT_RESIDUAL_THRESHOLD)
            .await?;
        let accuracy = self
            .prediction_accuracy(sensor_name, DEFAULT_ACCURACY_HOURS)
            .await?;
        let recent_performance = trainer::evaluate_recent(
            &self.pool,
            &self.store.get(sensor_name)?.model,
            sensor_name,
            DEFAULT_EVALUATION_LIMIT,
        )
        .await?;

        Ok(SensorPredictionReport {
            current_prediction,
            sequence_predictions,
            anomaly,
            accuracy,
            recent_performance,
        })
    }

    /// Prediction, forecast, residual check and accuracy for each sensor.
    ///
    /// A failing sensor gets an error entry; the others are unaffected.
    pub async fn prediction_report(&self, sensors: &[&str]) -> PredictionReport {
        let mut entries = BTreeMap::new();
        for sensor in sensors {
            let entry = match self.sensor_report(sensor).await {
                Ok(report) => SensorReportEntry::Ok(Box::new(report)),
                Err(e) => {
                    tracing::warn!(sensor = *sensor, error = %e, "Prediction report failed");
                    SensorReportEntry::Failed {
                        error: e.to_string(),
                    }
                }
            };
            entries.insert(sensor.to_string(), entry);
        }
        PredictionReport {
            timestamp: Utc::now(),
            sensors: entries,
        }
    }
}

/// Latest timestamp plus the latest sampling gap, or the default step when
/// the gap is unknown or not positive.
fn next_timestamp(points: &[Point]) -> Option<Timestamp> {
    let last = points.last()?;
    let gap = points
        .len()
        .checked_sub(2)
        .map(|i| last.ts - points[i].ts)
        .filter(|gap| *gap > Duration::zero())
        .unwrap_or_else(|| Duration::minutes(SEQUENCE_STEP_MINUTES));
    Some(last.ts + gap)
}

fn insufficient(sensor_name: &str, rows: usize) -> PipelineError {
    CoreError::InsufficientData {
        sensor: sensor_name.to_string(),
        rows,
        required: HISTORY,
    }
    .into()
}
