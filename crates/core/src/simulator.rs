//! Simulated ESP32 board with a DHT22 (temperature/humidity), an MPU6050
//! (accelerometer/gyroscope) and an LDR (luminosity).
//!
//! Pure logic: every reading is derived from an injected RNG and the sample
//! instant, so the simulator can be driven deterministically in tests. The
//! sampling loop with real sleeps lives in the pipeline crate.

use std::f64::consts::PI;

use chrono::Timelike;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::noise::{gauss, round2};
use crate::stats::Summary;
use crate::types::Timestamp;

/// Header line matching [`csv_line`].
pub const CSV_HEADER: &str = "Timestamp,Temperatura(C),Umidade(%),Luminosidade,\
Accel_X,Accel_Y,Accel_Z,Gyro_X,Gyro_Y,Gyro_Z";

/// Probability that a single MPU6050 sample shows excessive vibration.
pub const VIBRATION_SPIKE_PROBABILITY: f64 = 0.05;

const TEMP_ALERT_CELSIUS: f64 = 35.0;
const HUMIDITY_ALERT_PERCENT: f64 = 80.0;
const LUMINOSITY_ALERT_PERCENT: f64 = 10.0;
const VIBRATION_ALERT_MG: f64 = 2000.0;

/// One line of board output: all sensors sampled at the same instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Esp32Record {
    /// Unix seconds.
    pub timestamp: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub luminosity: f64,
    pub accel_x: i32,
    pub accel_y: i32,
    pub accel_z: i32,
    pub gyro_x: i32,
    pub gyro_y: i32,
    pub gyro_z: i32,
    pub datetime: Timestamp,
}

impl Esp32Record {
    /// Magnitude of the acceleration vector in mg.
    pub fn vibration_magnitude(&self) -> f64 {
        let (x, y, z) = (
            f64::from(self.accel_x),
            f64::from(self.accel_y),
            f64::from(self.accel_z),
        );
        (x * x + y * y + z * z).sqrt()
    }
}

/// Raw MPU6050 sample in mg (accelerometer) and mdps (gyroscope).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionSample {
    pub ax: i32,
    pub ay: i32,
    pub az: i32,
    pub gx: i32,
    pub gy: i32,
    pub gz: i32,
}

/// Hard-coded anomaly conditions evaluated on every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulatorAlert {
    HighTemperature,
    HighHumidity,
    LowLuminosity,
    ExcessiveVibration,
}

impl SimulatorAlert {
    pub fn message(self) -> &'static str {
        match self {
            Self::HighTemperature => "ALERTA: Temperatura elevada!",
            Self::HighHumidity => "ALERTA: Umidade muito alta!",
            Self::LowLuminosity => "ALERTA: Luminosidade muito baixa!",
            Self::ExcessiveVibration => "ALERTA: Vibração excessiva detectada!",
        }
    }
}

/// DHT22: daily sine around 25 °C / 55 % with gaussian noise.
///
/// Readings outside the sensor's physical range fall back to the nominal value.
pub fn read_dht22<R: Rng + ?Sized>(rng: &mut R, hour: u32) -> (f64, f64) {
    let phase = (2.0 * PI * f64::from(hour) / 24.0).sin();
    let mut temp = 25.0 + 5.0 * phase + gauss(rng, 0.0, 0.5);
    let mut humidity = 55.0 - 10.0 * phase + gauss(rng, 0.0, 2.0);

    if !(-40.0..=80.0).contains(&temp) {
        temp = 25.0;
    }
    if !(0.0..=100.0).contains(&humidity) {
        humidity = 55.0;
    }
    (temp, humidity)
}

/// MPU6050: small jitter around 1 g on Z, with occasional vibration spikes.
pub fn read_mpu6050<R: Rng + ?Sized>(rng: &mut R) -> MotionSample {
    let (ax, ay, az) = if rng.random_bool(VIBRATION_SPIKE_PROBABILITY) {
        (
            rng.random_range(-500..=500),
            rng.random_range(-500..=500),
            rng.random_range(800..=1200),
        )
    } else {
        (
            rng.random_range(-50..=50),
            rng.random_range(-50..=50),
            rng.random_range(950..=1050),
        )
    };

    MotionSample {
        ax,
        ay,
        az,
        gx: rng.random_range(-100..=100),
        gy: rng.random_range(-100..=100),
        gz: rng.random_range(-100..=100),
    }
}

/// LDR: bright during the day (06:00-18:59), dark at night, clamped to 0-100 %.
pub fn read_ldr<R: Rng + ?Sized>(rng: &mut R, hour: u32) -> f64 {
    let light = if (6..=18).contains(&hour) {
        70.0 + gauss(rng, 0.0, 10.0)
    } else {
        10.0 + gauss(rng, 0.0, 5.0)
    };
    light.clamp(0.0, 100.0)
}

/// Sample all sensors at `at`.
pub fn collect<R: Rng + ?Sized>(rng: &mut R, at: Timestamp) -> Esp32Record {
    let hour = at.hour();
    let (temp, humidity) = read_dht22(rng, hour);
    let motion = read_mpu6050(rng);
    let light = read_ldr(rng, hour);

    Esp32Record {
        timestamp: at.timestamp(),
        temperature: round2(temp),
        humidity: round2(humidity),
        luminosity: round2(light),
        accel_x: motion.ax,
        accel_y: motion.ay,
        accel_z: motion.az,
        gyro_x: motion.gx,
        gyro_y: motion.gy,
        gyro_z: motion.gz,
        datetime: at,
    }
}

/// Evaluate the firmware's fixed alert conditions.
pub fn analyze(record: &Esp32Record) -> Vec<SimulatorAlert> {
    let mut alerts = Vec::new();
    if record.temperature > TEMP_ALERT_CELSIUS {
        alerts.push(SimulatorAlert::HighTemperature);
    }
    if record.humidity > HUMIDITY_ALERT_PERCENT {
        alerts.push(SimulatorAlert::HighHumidity);
    }
    if record.luminosity < LUMINOSITY_ALERT_PERCENT {
        alerts.push(SimulatorAlert::LowLuminosity);
    }
    if record.vibration_magnitude() > VIBRATION_ALERT_MG {
        alerts.push(SimulatorAlert::ExcessiveVibration);
    }
    alerts
}

/// Render a record as one CSV line (see [`CSV_HEADER`]).
pub fn csv_line(r: &Esp32Record) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{}",
        r.timestamp,
        r.temperature,
        r.humidity,
        r.luminosity,
        r.accel_x,
        r.accel_y,
        r.accel_z,
        r.gyro_x,
        r.gyro_y,
        r.gyro_z
    )
}

/// Per-metric statistics over a simulation buffer.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub total_records: usize,
    pub temperature: Summary,
    pub humidity: Summary,
    pub luminosity: Summary,
    pub vibration: Summary,
}

/// Board state: an RNG plus the records collected so far.
#[derive(Debug)]
pub struct Esp32Simulator<R> {
    rng: R,
    buffer: Vec<Esp32Record>,
}

impl<R: Rng> Esp32Simulator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            buffer: Vec::new(),
        }
    }

    /// Sample all sensors at `at`, buffer the record and return it.
    pub fn sample(&mut self, at: Timestamp) -> &Esp32Record {
        let record = collect(&mut self.rng, at);
        self.buffer.push(record);
        &self.buffer[self.buffer.len() - 1]
    }

    pub fn records(&self) -> &[Esp32Record] {
        &self.buffer
    }

    pub fn into_records(self) -> Vec<Esp32Record> {
        self.buffer
    }

    /// Statistics over the buffer; `None` when nothing has been sampled.
    pub fn summary(&self) -> Option<SimulationSummary> {
        summarize(&self.buffer)
    }
}

/// Statistics over a slice of records; `None` when empty.
pub fn summarize(records: &[Esp32Record]) -> Option<SimulationSummary> {
    let pick = |f: fn(&Esp32Record) -> f64| -> Vec<f64> { records.iter().map(f).collect() };

    Some(SimulationSummary {
        total_records: records.len(),
        temperature: Summary::from_values(&pick(|r| r.temperature))?,
        humidity: Summary::from_values(&pick(|r| r.humidity))?,
        luminosity: Summary::from_values(&pick(|r| r.luminosity))?,
        vibration: Summary::from_values(&pick(Esp32Record::vibration_magnitude))?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn at_hour(hour: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 20, hour, 0, 0).unwrap()
    }

    fn record(temperature: f64, humidity: f64, luminosity: f64, az: i32) -> Esp32Record {
        Esp32Record {
            timestamp: 0,
            temperature,
            humidity,
            luminosity,
            accel_x: 0,
            accel_y: 0,
            accel_z: az,
            gyro_x: 0,
            gyro_y: 0,
            gyro_z: 0,
            datetime: at_hour(12),
        }
    }

    #[test]
    fn readings_stay_within_physical_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for i in 0..2_000 {
            let r = collect(&mut rng, at_hour(i % 24));
            assert!((-40.0..=80.0).contains(&r.temperature));
            assert!((0.0..=100.0).contains(&r.humidity));
            assert!((0.0..=100.0).contains(&r.luminosity));
            assert!((-500..=500).contains(&r.accel_x));
            assert!((800..=1200).contains(&r.accel_z));
            assert!((-100..=100).contains(&r.gyro_z));
        }
    }

    #[test]
    fn luminosity_follows_day_night_cycle() {
        let mut rng = StdRng::seed_from_u64(3);
        let day: f64 = (0..500).map(|_| read_ldr(&mut rng, 12)).sum::<f64>() / 500.0;
        let night: f64 = (0..500).map(|_| read_ldr(&mut rng, 2)).sum::<f64>() / 500.0;
        assert!(day > 60.0, "day average {day}");
        assert!(night < 20.0, "night average {night}");
    }

    #[test]
    fn values_are_rounded_to_two_decimals() {
        let mut rng = StdRng::seed_from_u64(9);
        let r = collect(&mut rng, at_hour(10));
        assert_eq!(r.temperature, round2(r.temperature));
        assert_eq!(r.humidity, round2(r.humidity));
        assert_eq!(r.luminosity, round2(r.luminosity));
    }

    #[test]
    fn timestamp_matches_datetime() {
        let mut rng = StdRng::seed_from_u64(9);
        let at = at_hour(7);
        let r = collect(&mut rng, at);
        assert_eq!(r.timestamp, at.timestamp());
        assert_eq!(r.datetime, at);
    }

    #[test]
    fn nominal_record_raises_no_alerts() {
        assert!(analyze(&record(25.0, 55.0, 50.0, 1000)).is_empty());
    }

    #[test]
    fn every_condition_is_reported() {
        let alerts = analyze(&record(36.0, 81.0, 9.0, 2500));
        assert_eq!(
            alerts,
            vec![
                SimulatorAlert::HighTemperature,
                SimulatorAlert::HighHumidity,
                SimulatorAlert::LowLuminosity,
                SimulatorAlert::ExcessiveVibration,
            ]
        );
    }

    #[test]
    fn alert_messages_match_firmware_text() {
        assert_eq!(SimulatorAlert::HighTemperature.message(), "ALERTA: Temperatura elevada!");
        assert_eq!(SimulatorAlert::HighHumidity.message(), "ALERTA: Umidade muito alta!");
        assert_eq!(SimulatorAlert::LowLuminosity.message(), "ALERTA: Luminosidade muito baixa!");
        assert_eq!(
            SimulatorAlert::ExcessiveVibration.message(),
            "ALERTA: Vibração excessiva detectada!"
        );
    }

    #[test]
    fn thresholds_are_strict() {
        assert!(analyze(&record(35.0, 80.0, 10.0, 2000)).is_empty());
    }

    #[test]
    fn vibration_is_vector_magnitude() {
        let mut r = record(25.0, 55.0, 50.0, 0);
        r.accel_x = 3;
        r.accel_y = 4;
        assert_eq!(r.vibration_magnitude(), 5.0);
    }

    #[test]
    fn csv_line_has_ten_fields() {
        let line = csv_line(&record(25.5, 55.25, 50.0, 1000));
        assert_eq!(line.split(',').count(), 10);
        assert!(line.starts_with("0,25.5,55.25,50,"));
        assert_eq!(CSV_HEADER.split(',').count(), 10);
    }

    #[test]
    fn simulator_buffers_samples_and_summarizes() {
        let mut sim = Esp32Simulator::new(StdRng::seed_from_u64(11));
        assert!(sim.summary().is_none());
        for h in 0..5 {
            sim.sample(at_hour(h));
        }
        let summary = sim.summary().unwrap();
        assert_eq!(summary.total_records, 5);
        assert_eq!(summary.temperature.count, 5);
        assert!(summary.vibration.min > 0.0);
        assert_eq!(sim.into_records().len(), 5);
    }

    #[test]
    fn record_serializes_with_firmware_field_names() {
        let json = serde_json::to_value(record(25.0, 55.0, 50.0, 1000)).unwrap();
        for key in [
            "timestamp",
            "temperature",
            "humidity",
            "luminosity",
            "accel_x",
            "accel_y",
            "accel_z",
            "gyro_x",
            "gyro_y",
            "gyro_z",
            "datetime",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
