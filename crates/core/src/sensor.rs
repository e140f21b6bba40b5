//! Sensor catalog: measurement kinds, the default sensor set and the default asset.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const SENSOR_TEMP: &str = "S_TEMP";
pub const SENSOR_HUMIDITY: &str = "S_HUMIDITY";
pub const SENSOR_LIGHT: &str = "S_LIGHT";
pub const SENSOR_VIBRATION: &str = "S_VIBRATION";

/// Name of the asset every default sensor is attached to.
pub const DEFAULT_ASSET_NAME: &str = "Linha de Produção Principal";
/// Location of the default asset.
pub const DEFAULT_ASSET_LOCATION: &str = "Setor A - Fábrica";

/// Names of the default sensors, in catalog order.
pub const DEFAULT_SENSOR_NAMES: [&str; 4] =
    [SENSOR_TEMP, SENSOR_HUMIDITY, SENSOR_LIGHT, SENSOR_VIBRATION];

/// Physical quantity measured by a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Temperature,
    Humidity,
    Luminosity,
    Vibration,
}

impl SensorKind {
    /// The value stored in the `sensor.type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Luminosity => "luminosity",
            Self::Vibration => "vibration",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" => Ok(Self::Temperature),
            "humidity" => Ok(Self::Humidity),
            "luminosity" | "light" => Ok(Self::Luminosity),
            "vibration" => Ok(Self::Vibration),
            other => Err(CoreError::Validation(format!(
                "unknown sensor type '{other}'"
            ))),
        }
    }
}

/// Static description of a measurement channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorSpec {
    pub name: &'static str,
    pub kind: SensorKind,
    pub unit: &'static str,
    pub min_value: f64,
    pub max_value: f64,
}

impl SensorSpec {
    /// Whether `value` lies within the declared bounds (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        (self.min_value..=self.max_value).contains(&value)
    }
}

/// The four sensors wired to the simulated ESP32 board.
pub fn default_sensors() -> [SensorSpec; 4] {
    [
        SensorSpec {
            name: SENSOR_TEMP,
            kind: SensorKind::Temperature,
            unit: "°C",
            min_value: -40.0,
            max_value: 80.0,
        },
        SensorSpec {
            name: SENSOR_HUMIDITY,
            kind: SensorKind::Humidity,
            unit: "%",
            min_value: 0.0,
            max_value: 100.0,
        },
        SensorSpec {
            name: SENSOR_LIGHT,
            kind: SensorKind::Luminosity,
            unit: "%",
            min_value: 0.0,
            max_value: 100.0,
        },
        SensorSpec {
            name: SENSOR_VIBRATION,
            kind: SensorKind::Vibration,
            unit: "mg",
            min_value: 0.0,
            max_value: 5000.0,
        },
    ]
}

/// Look up a default sensor by name.
pub fn find_default_sensor(name: &str) -> Option<SensorSpec> {
    default_sensors().into_iter().find(|s| s.name == name)
}
