//! Threshold evaluation for sensor readings.
//!
//! Pure logic: no database access. The caller fetches readings, passes them
//! in, and decides whether to persist the resulting alerts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::sensor::{SENSOR_HUMIDITY, SENSOR_LIGHT, SENSOR_TEMP, SENSOR_VIBRATION};
use crate::types::Timestamp;

/// `alert.alert_type` for fixed-threshold violations.
pub const ALERT_TYPE_THRESHOLD: &str = "threshold";
/// `alert.alert_type` for model-residual anomalies.
pub const ALERT_TYPE_PREDICTION: &str = "prediction_residual";

/// Ratio beyond a maximum (or below a minimum) at which a violation is `High`.
const HIGH_ABOVE_RATIO: f64 = 1.5;
const HIGH_BELOW_RATIO: f64 = 0.5;

/// Severity stored in `alert.severity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub const ALL: [AlertSeverity; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertSeverity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(CoreError::Validation(format!(
                "unknown alert severity '{other}'"
            ))),
        }
    }
}

/// Which side of a rule was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    BelowMinimum,
    AboveMaximum,
}

/// Optional lower and upper limits for one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub sensor_name: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// A rule crossing for a single value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub threshold: f64,
    pub severity: AlertSeverity,
}

impl Violation {
    /// Human-readable description stored in `alert.message`.
    pub fn message(&self, sensor_name: &str, value: f64) -> String {
        match self.kind {
            ViolationKind::AboveMaximum => format!(
                "{sensor_name}: value {value:.2} exceeds threshold {:.2}",
                self.threshold
            ),
            ViolationKind::BelowMinimum => format!(
                "{sensor_name}: value {value:.2} is below threshold {:.2}",
                self.threshold
            ),
        }
    }
}

impl ThresholdRule {
    pub fn new(sensor_name: &str, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            sensor_name: sensor_name.to_string(),
            min,
            max,
        }
    }

    /// Compare `value` against the rule; `None` when within limits.
    ///
    /// Limits are exclusive: a value equal to a limit is not a violation.
    pub fn check(&self, value: f64) -> Option<Violation> {
        if let Some(max) = self.max {
            if value > max {
                let severity = if value > max * HIGH_ABOVE_RATIO {
                    AlertSeverity::High
                } else {
                    AlertSeverity::Medium
                };
                return Some(Violation {
                    kind: ViolationKind::AboveMaximum,
                    threshold: max,
                    severity,
                });
            }
        }
        if let Some(min) = self.min {
            if value < min {
                let severity = if value < min * HIGH_BELOW_RATIO {
                    AlertSeverity::High
                } else {
                    AlertSeverity::Medium
                };
                return Some(Violation {
                    kind: ViolationKind::BelowMinimum,
                    threshold: min,
                    severity,
                });
            }
        }
        None
    }
}

/// Operating limits for the default sensors.
pub fn default_rules() -> Vec<ThresholdRule> {
    vec![
        ThresholdRule::new(SENSOR_TEMP, None, Some(35.0)),
        ThresholdRule::new(SENSOR_HUMIDITY, None, Some(80.0)),
        ThresholdRule::new(SENSOR_VIBRATION, None, Some(2000.0)),
        ThresholdRule::new(SENSOR_LIGHT, Some(10.0), None),
    ]
}

/// A reading handed to [`evaluate`].
#[derive(Debug, Clone)]
pub struct ObservedValue {
    pub sensor_name: String,
    pub value: f64,
    pub ts: Timestamp,
}

/// A violation attributed to a specific reading.
#[derive(Debug, Clone, Serialize)]
pub struct Anomaly {
    pub sensor_name: String,
    pub ts: Timestamp,
    pub value: f64,
    pub kind: ViolationKind,
    pub threshold: f64,
    pub severity: AlertSeverity,
}

impl Anomaly {
    pub fn message(&self) -> String {
        Violation {
            kind: self.kind,
            threshold: self.threshold,
            severity: self.severity,
        }
        .message(&self.sensor_name, self.value)
    }
}

/// Check each observation against the rule for its sensor.
///
/// Observations for sensors without a rule are ignored.
pub fn evaluate(observations: &[ObservedValue], rules: &[ThresholdRule]) -> Vec<Anomaly> {
    observations
        .iter()
        .filter_map(|obs| {
            let rule = rules.iter().find(|r| r.sensor_name == obs.sensor_name)?;
            let violation = rule.check(obs.value)?;
            Some(Anomaly {
                sensor_name: obs.sensor_name.clone(),
                ts: obs.ts,
                value: obs.value,
                kind: violation.kind,
                threshold: violation.threshold,
                severity: violation.severity,
            })
        })
        .collect()
}

/// Severity of a model residual expressed in standard deviations.
///
/// `None` when within `threshold`; `High` beyond twice the threshold.
pub fn residual_severity(normalized_error: f64, threshold: f64) -> Option<AlertSeverity> {
    if normalized_error.is_nan() || normalized_error <= threshold {
        return None;
    }
    if normalized_error > threshold * 2.0 {
        Some(AlertSeverity::High)
    } else {
        Some(AlertSeverity::Medium)
    }
}
