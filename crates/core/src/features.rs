//! Lag-feature engineering for next-value regression.
//!
//! Each reading is described by the two readings before it (`lag1`, `lag2`),
//! the mean of the three readings before it (`roll3`) and its UTC hour of
//! day. Features only look backwards, so the target never leaks into its own
//! feature row. Readings without three predecessors are dropped.

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Column names in model order.
pub const FEATURE_COLUMNS: [&str; 4] = ["lag1", "lag2", "roll3", "hour"];

/// Number of preceding readings a feature row needs.
pub const HISTORY: usize = 3;

/// A single timestamped value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub ts: Timestamp,
    pub value: f64,
}

/// Model inputs for one target reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub lag1: f64,
    pub lag2: f64,
    pub roll3: f64,
    pub hour: f64,
}

impl FeatureRow {
    /// Values in [`FEATURE_COLUMNS`] order.
    pub fn to_array(&self) -> [f64; 4] {
        [self.lag1, self.lag2, self.roll3, self.hour]
    }

    /// Shift the window forward by one predicted step.
    ///
    /// The new row treats `predicted` as the most recent reading; `roll3`
    /// becomes the mean of `predicted` and the two previous lags.
    pub fn roll_forward(&self, predicted: f64, next_hour: u32) -> Self {
        Self {
            lag1: predicted,
            lag2: self.lag1,
            roll3: (predicted + self.lag1 + self.lag2) / 3.0,
            hour: f64::from(next_hour),
        }
    }
}

/// Feature rows with their targets, aligned by index.
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub rows: Vec<FeatureRow>,
    pub targets: Vec<f64>,
    pub timestamps: Vec<Timestamp>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Temporal split: the first `1 - test_size` share trains, the rest tests.
    pub fn split(&self, test_size: f64) -> (TrainingSet, TrainingSet) {
        let split_idx = ((self.len() as f64) * (1.0 - test_size)).floor() as usize;
        let split_idx = split_idx.min(self.len());
        let head = TrainingSet {
            rows: self.rows[..split_idx].to_vec(),
            targets: self.targets[..split_idx].to_vec(),
            timestamps: self.timestamps[..split_idx].to_vec(),
        };
        let tail = TrainingSet {
            rows: self.rows[split_idx..].to_vec(),
            targets: self.targets[split_idx..].to_vec(),
            timestamps: self.timestamps[split_idx..].to_vec(),
        };
        (head, tail)
    }
}

/// Build the training set for a series.
///
/// Points are sorted by timestamp first; output length is
/// `points.len() - HISTORY` (zero when there is not enough history).
pub fn build(points: &[Point]) -> TrainingSet {
    let mut sorted = points.to_vec();
    sorted.sort_by_key(|p| p.ts);

    let mut set = TrainingSet::default();
    for i in HISTORY..sorted.len() {
        let window = &sorted[i - HISTORY..i];
        set.rows.push(row_from_window(window, sorted[i].ts));
        set.targets.push(sorted[i].value);
        set.timestamps.push(sorted[i].ts);
    }
    set
}

/// Feature row for the reading that would follow the last of `points` at `next_ts`.
pub fn next_features(points: &[Point], next_ts: Timestamp) -> Result<FeatureRow, CoreError> {
    if points.len() < HISTORY {
        return Err(CoreError::Validation(format!(
            "need at least {HISTORY} readings to build features, got {}",
            points.len()
        )));
    }
    let mut sorted = points.to_vec();
    sorted.sort_by_key(|p| p.ts);
    Ok(row_from_window(&sorted[sorted.len() - HISTORY..], next_ts))
}

/// `window` holds exactly `HISTORY` points, oldest first.
fn row_from_window(window: &[Point], target_ts: Timestamp) -> FeatureRow {
    let n = window.len();
    FeatureRow {
        lag1: window[n - 1].value,
        lag2: window[n - 2].value,
        roll3: window.iter().map(|p| p.value).sum::<f64>() / n as f64,
        hour: f64::from(target_ts.hour()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn series(values: &[f64]) -> Vec<Point> {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Point {
                ts: start + Duration::minutes(30 * i as i64),
                value: *v,
            })
            .collect()
    }

    #[test]
    fn drops_rows_without_history() {
        let set = build(&series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        assert_eq!(set.len(), 3);
        assert_eq!(set.targets, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn short_series_yields_empty_set() {
        assert!(build(&series(&[1.0, 2.0, 3.0])).is_empty());
        assert!(build(&[]).is_empty());
    }

    #[test]
    fn features_only_look_backwards() {
        let set = build(&series(&[1.0, 2.0, 3.0, 10.0]));
        let row = set.rows[0];
        assert_eq!(row.lag1, 3.0);
        assert_eq!(row.lag2, 2.0);
        assert_eq!(row.roll3, 2.0);
        // 08:00 + 3 * 30 min = 09:30
        assert_eq!(row.hour, 9.0);
        assert_eq!(set.targets[0], 10.0);
    }

    #[test]
    fn unsorted_input_is_ordered_by_timestamp() {
        let mut points = series(&[1.0, 2.0, 3.0, 4.0]);
        points.reverse();
        let set = build(&points);
        assert_eq!(set.targets, vec![4.0]);
        assert_eq!(set.rows[0].lag1, 3.0);
    }

    #[test]
    fn next_features_use_last_three_readings() {
        let points = series(&[5.0, 1.0, 2.0, 3.0]);
        let next_ts = points[3].ts + Duration::minutes(30);
        let row = next_features(&points, next_ts).unwrap();
        assert_eq!(row.lag1, 3.0);
        assert_eq!(row.lag2, 2.0);
        assert_eq!(row.roll3, 2.0);
        assert_eq!(row.hour, f64::from(next_ts.hour()));
    }

    #[test]
    fn next_features_require_history() {
        assert!(next_features(&series(&[1.0, 2.0]), Utc::now()).is_err());
    }

    #[test]
    fn roll_forward_shifts_lags() {
        let row = FeatureRow {
            lag1: 3.0,
            lag2: 2.0,
            roll3: 2.0,
            hour: 9.0,
        };
        let next = row.roll_forward(6.0, 10);
        assert_eq!(next.lag1, 6.0);
        assert_eq!(next.lag2, 3.0);
        assert_eq!(next.roll3, (6.0 + 3.0 + 2.0) / 3.0);
        assert_eq!(next.hour, 10.0);
    }

    #[test]
    fn split_is_temporal() {
        let set = build(&series(&(0..13).map(f64::from).collect::<Vec<_>>()));
        assert_eq!(set.len(), 10);
        let (train, test) = set.split(0.2);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        assert!(train.timestamps.last().unwrap() < test.timestamps.first().unwrap());
    }
}
