//! Timed ESP32 sampling loop.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use predmaint_core::error::CoreError;
use predmaint_core::simulator::{analyze, csv_line, Esp32Record, Esp32Simulator, CSV_HEADER};
use rand::Rng;
use tokio::time::Instant;

use crate::error::PipelineResult;
use crate::report;

/// How long to sample and how often.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationOptions {
    pub duration: Duration,
    pub interval: Duration,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(120),
            interval: Duration::from_secs(5),
        }
    }
}

/// Sample every `options.interval` until `options.duration` has elapsed.
///
/// Each record is logged as a CSV line; board-level alerts are logged as
/// warnings. Records accumulate in the simulator buffer. Returns the number
/// of records collected by this call.
pub async fn run_simulation<R: Rng>(
    simulator: &mut Esp32Simulator<R>,
    options: &SimulationOptions,
) -> PipelineResult<usize> {
    if options.interval.is_zero() {
        return Err(CoreError::Validation("simulation interval must be positive".to_string()).into());
    }

    tracing::info!(
        duration_secs = options.duration.as_secs_f64(),
        interval_secs = options.interval.as_secs_f64(),
        header = CSV_HEADER,
        "Starting ESP32 simulation",
    );

    let started = Instant::now();
    let mut collected = 0;
    while started.elapsed() < options.duration {
        let record = simulator.sample(Utc::now());
        tracing::info!(csv = %csv_line(record), "Sample");
        for alert in analyze(record) {
            tracing::warn!(alert = alert.message(), timestamp = record.timestamp, "Board alert");
        }
        collected += 1;
        tokio::time::sleep(options.interval).await;
    }

    tracing::info!(records = collected, "Simulation finished");
    Ok(collected)
}

/// Write collected records to `path` as a JSON array.
pub async fn save_records(path: &Path, records: &[Esp32Record]) -> PipelineResult<()> {
    report::write_json(path, records).await
}
