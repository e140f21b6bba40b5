//! Per-sensor model training and evaluation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use predmaint_core::error::CoreError;
use predmaint_core::features::{self, Point, TrainingSet};
use predmaint_core::metrics::{mae, r2, rmse};
use predmaint_core::regression::LinearModel;
use predmaint_core::types::Timestamp;
use predmaint_core::validation::validate_open_fraction;
use predmaint_db::repositories::ReadingRepo;
use predmaint_db::DbPool;
use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;
use crate::report;

/// Readings fetched per sensor for training.
pub const DEFAULT_TRAINING_LIMIT: i64 = 1000;
/// Feature rows a sensor needs before a model is fitted.
pub const MIN_TRAINING_ROWS: usize = 10;
/// Share of feature rows held out for testing.
pub const DEFAULT_TEST_SIZE: f64 = 0.2;
/// Readings used by [`evaluate_recent`].
pub const DEFAULT_EVALUATION_LIMIT: i64 = 100;

pub const MODEL_TYPE_LINEAR: &str = "linear";

/// A fitted model as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedModel {
    pub sensor_name: String,
    pub model_type: String,
    pub trained_at: Timestamp,
    pub model: LinearModel,
}

impl SavedModel {
    /// Key used in reports and prediction outcomes, e.g. `S_TEMP_linear`.
    pub fn key(&self) -> String {
        model_key(&self.sensor_name)
    }
}

pub fn model_key(sensor_name: &str) -> String {
    format!("{sensor_name}_{MODEL_TYPE_LINEAR}")
}

/// Where the model for `sensor_name` lives under `models_dir`.
pub fn model_path(models_dir: &Path, sensor_name: &str) -> PathBuf {
    models_dir.join(format!("{sensor_name}_{MODEL_TYPE_LINEAR}_model.json"))
}

/// Metrics and metadata of one training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingResult {
    pub model_type: String,
    pub sensor_name: String,
    pub mae: f64,
    pub r2: f64,
    pub rmse: f64,
    pub train_samples: usize,
    pub test_samples: usize,
    pub model_path: PathBuf,
    pub feature_importance: BTreeMap<String, f64>,
}

/// Results of [`train_all`]: successes keyed by model key, failures by sensor.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrainingReport {
    pub results: BTreeMap<String, TrainingResult>,
    pub errors: BTreeMap<String, String>,
}

/// Load the newest `limit` readings of a sensor and build feature rows.
///
/// Fails with [`CoreError::InsufficientData`] below [`MIN_TRAINING_ROWS`] rows.
pub async fn prepare_training_data(
    pool: &DbPool,
    sensor_name: &str,
    limit: i64,
) -> PipelineResult<TrainingSet> {
    let points: Vec<Point> = ReadingRepo::recent_by_sensor_name(pool, sensor_name, limit)
        .await?
        .into_iter()
        .map(Point::from)
        .collect();

    let set = features::build(&points);
    if set.len() < MIN_TRAINING_ROWS {
        return Err(CoreError::InsufficientData {
            sensor: sensor_name.to_string(),
            rows: set.len(),
            required: MIN_TRAINING_ROWS,
        }
        .into());
    }
    Ok(set)
}

/// Fit a linear model on the earlier readings and score it on the later ones.
///
/// The fitted model is written to [`model_path`].
pub async fn train_linear(
    pool: &DbPool,
    models_dir: &Path,
    sensor_name: &str,
    test_size: f64,
) -> PipelineResult<(TrainingResult, SavedModel)> {
    validate_open_fraction(test_size, "test_size")?;

    let set = prepare_training_data(pool, sensor_name, DEFAULT_TRAINING_LIMIT).await?;
    let (train, test) = set.split(test_size);

    let model = LinearModel::fit(&train.rows, &train.targets)?;
    let predicted = model.predict_many(&test.rows);

    let path = model_path(models_dir, sensor_name);
    let saved = SavedModel {
        sensor_name: sensor_name.to_string(),
        model_type: MODEL_TYPE_LINEAR.to_string(),
        trained_at: Utc::now(),
        model,
    };
    report::write_json(&path, &saved).await?;

    let result = TrainingResult {
        model_type: MODEL_TYPE_LINEAR.to_string(),
        sensor_name: sensor_name.to_string(),
        mae: mae(&test.targets, &predicted)?,
        r2: r2(&test.targets, &predicted)?,
        rmse: rmse(&test.targets, &predicted)?,
        train_samples: train.len(),
        test_samples: test.len(),
        model_path: path,
        feature_importance: saved.model.feature_importance(),
    };

    tracing::info!(
        sensor = sensor_name,
        mae = result.mae,
        r2 = result.r2,
        train_samples = result.train_samples,
        test_samples = result.test_samples,
        "Model trained",
    );
    Ok((result, saved))
}

/// Train every sensor in turn; one sensor's failure does not stop the rest.
pub async fn train_all(
    pool: &DbPool,
    models_dir: &Path,
    sensors: &[&str],
) -> TrainingReport {
    let mut report = TrainingReport::default();
    for sensor in sensors {
        match train_linear(pool, models_dir, sensor, DEFAULT_TEST_SIZE).await {
            Ok((result, saved)) => {
                report.results.insert(saved.key(), result);
            }
            Err(e) => {
                tracing::error!(sensor = *sensor, error = %e, "Training failed");
                report.errors.insert(sensor.to_string(), e.to_string());
            }
        }
    }
    report
}

pub async fn save_results(path: &Path, report: &TrainingReport) -> PipelineResult<()> {
    report::write_json(path, report).await
}

/// Scores of a stored model on a sensor's latest readings.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub mae: f64,
    pub r2: f64,
    pub test_samples: usize,
}

/// Score `model` on the last fifth of the newest `limit` readings.
///
/// `None` when there are fewer than [`MIN_TRAINING_ROWS`] feature rows.
pub async fn evaluate_recent(
    pool: &DbPool,
    model: &LinearModel,
    sensor_name: &str,
    limit: i64,
) -> PipelineResult<Option<Evaluation>> {
    let set = match prepare_training_data(pool, sensor_name, limit).await {
        Ok(set) => set,
        Err(crate::PipelineError::Core(CoreError::InsufficientData { .. })) => return Ok(None),
        Err(e) => return Err(e),
    };
    let (_, test) = set.split(DEFAULT_TEST_SIZE);
    let predicted = model.predict_many(&test.rows);

    Ok(Some(Evaluation {
        mae: mae(&test.targets, &predicted)?,
        r2: r2(&test.targets, &predicted)?,
        test_samples: test.len(),
    }))
}
