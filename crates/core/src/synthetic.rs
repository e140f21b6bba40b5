//! Synthetic multi-day history for the four default sensors.
//!
//! Used to seed a demo database with enough readings for training: a daily
//! temperature cycle with a slow upward trend, humidity anti-correlated with
//! temperature, a day/night light pattern and a vibration baseline with rare
//! spikes.

use std::f64::consts::PI;

use chrono::{Duration, Timelike, Utc};
use rand::Rng;

use crate::error::CoreError;
use crate::noise::gauss;
use crate::sensor::{SENSOR_HUMIDITY, SENSOR_LIGHT, SENSOR_TEMP, SENSOR_VIBRATION};
use crate::types::Timestamp;
use crate::validation::validate_count_range;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Maximum history that may be generated in one call.
pub const MAX_DAYS: i64 = 365;

/// Probability of a vibration spike at any given period.
pub const VIBRATION_SPIKE_PROBABILITY: f64 = 0.05;

/// Parameters for [`generate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticConfig {
    pub days: i64,
    pub frequency_minutes: i64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            days: 7,
            frequency_minutes: 5,
        }
    }
}

impl SyntheticConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_count_range(self.days, 1, MAX_DAYS, "days")?;
        validate_count_range(self.frequency_minutes, 1, MINUTES_PER_DAY, "frequency_minutes")
    }

    /// Number of samples per sensor.
    pub fn periods(&self) -> usize {
        if self.days <= 0 || self.frequency_minutes <= 0 {
            return 0;
        }
        (self.days * MINUTES_PER_DAY / self.frequency_minutes) as usize
    }

    /// Default start: `days` before now. Fails on an invalid config.
    pub fn default_start(&self) -> Result<Timestamp, CoreError> {
        self.validate()?;
        Utc::now()
            .checked_sub_signed(Duration::days(self.days))
            .ok_or_else(|| CoreError::Validation(format!("days {} is out of range", self.days)))
    }
}

/// Generated history: shared timestamps plus one value series per sensor.
#[derive(Debug, Clone)]
pub struct SyntheticSeries {
    pub timestamps: Vec<Timestamp>,
    /// `(sensor_name, values)` in catalog order; every series has `timestamps.len()` values.
    pub series: Vec<(&'static str, Vec<f64>)>,
}

impl SyntheticSeries {
    pub fn values_for(&self, sensor_name: &str) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|(name, _)| *name == sensor_name)
            .map(|(_, values)| values.as_slice())
    }

    /// Total number of readings across all sensors.
    pub fn total_readings(&self) -> usize {
        self.series.iter().map(|(_, v)| v.len()).sum()
    }
}

/// Generate `config.periods()` samples per sensor starting at `start`.
pub fn generate<R: Rng + ?Sized>(
    config: &SyntheticConfig,
    start: Timestamp,
    rng: &mut R,
) -> Result<SyntheticSeries, CoreError> {
    config.validate()?;
    let periods = config.periods();
    let freq = config.frequency_minutes;

    let timestamps: Vec<Timestamp> = (0..periods)
        .map(|i| start + Duration::minutes(i as i64 * freq))
        .collect();

    let daily_phase: Vec<f64> = (0..periods)
        .map(|i| (2.0 * PI * (i as f64) * (freq as f64) / MINUTES_PER_DAY as f64).sin())
        .collect();

    let temp: Vec<f64> = daily_phase
        .iter()
        .enumerate()
        .map(|(i, phase)| 25.0 + 8.0 * phase + linspace_at(0.0, 2.0, periods, i) + gauss(rng, 0.0, 0.5))
        .collect();

    let humidity: Vec<f64> = daily_phase
        .iter()
        .map(|phase| (60.0 - 15.0 * phase + gauss(rng, 0.0, 3.0)).clamp(0.0, 100.0))
        .collect();

    let light: Vec<f64> = timestamps
        .iter()
        .map(|ts| {
            let value = if (6..=18).contains(&ts.hour()) {
                70.0 + gauss(rng, 0.0, 10.0)
            } else {
                10.0 + gauss(rng, 0.0, 5.0)
            };
            value.clamp(0.0, 100.0)
        })
        .collect();

    let vibration: Vec<f64> = (0..periods)
        .map(|_| {
            let value = if rng.random_bool(VIBRATION_SPIKE_PROBABILITY) {
                1000.0 + gauss(rng, 0.0, 500.0) + 2000.0
            } else {
                1000.0 + gauss(rng, 0.0, 100.0)
            };
            value.max(0.0)
        })
        .collect();

    Ok(SyntheticSeries {
        timestamps,
        series: vec![
            (SENSOR_TEMP, temp),
            (SENSOR_HUMIDITY, humidity),
            (SENSOR_LIGHT, light),
            (SENSOR_VIBRATION, vibration),
        ],
    })
}

/// The `i`-th of `n` evenly spaced points between `start` and `end` (inclusive).
fn linspace_at(start: f64, end: f64, n: usize, i: usize) -> f64 {
    if n <= 1 {
        return start;
    }
    start + (end - start) * (i as f64) / ((n - 1) as f64)
}
