//! The default asset and its sensors.

use std::collections::BTreeMap;

use predmaint_core::error::CoreError;
use predmaint_core::sensor::{default_sensors, DEFAULT_ASSET_LOCATION, DEFAULT_ASSET_NAME};
use predmaint_core::types::DbId;
use predmaint_db::models::asset::CreateAsset;
use predmaint_db::models::sensor::CreateSensor;
use predmaint_db::repositories::{AssetRepo, SensorRepo};
use predmaint_db::DbPool;
use serde::Serialize;

use crate::error::PipelineResult;

/// IDs of the default asset and its sensors.
#[derive(Debug, Clone, Serialize)]
pub struct Topology {
    pub asset_id: DbId,
    pub sensor_ids: BTreeMap<String, DbId>,
}

impl Topology {
    pub fn sensor_id(&self, sensor_name: &str) -> Result<DbId, CoreError> {
        self.sensor_ids
            .get(sensor_name)
            .copied()
            .ok_or_else(|| CoreError::UnknownSensor(sensor_name.to_string()))
    }
}

/// Find or create the default asset and its four sensors.
///
/// Idempotent: running it again returns the same IDs without inserting rows.
pub async fn ensure_default_topology(pool: &DbPool) -> PipelineResult<Topology> {
    let asset = match AssetRepo::find_by_name(pool, DEFAULT_ASSET_NAME).await? {
        Some(asset) => asset,
        None => {
            let asset = AssetRepo::create(
                pool,
                &CreateAsset {
                    name: DEFAULT_ASSET_NAME.to_string(),
                    location: Some(DEFAULT_ASSET_LOCATION.to_string()),
                },
            )
            .await?;
            tracing::info!(asset_id = asset.id, name = %asset.name, "Asset created");
            asset
        }
    };

    let mut sensor_ids = BTreeMap::new();
    for spec in default_sensors() {
        let sensor = match SensorRepo::find_by_name(pool, spec.name).await? {
            Some(sensor) => sensor,
            None => {
                let sensor =
                    SensorRepo::create(pool, &CreateSensor::from_spec(asset.id, &spec)).await?;
                tracing::info!(sensor_id = sensor.id, name = %sensor.name, "Sensor created");
                sensor
            }
        };
        sensor_ids.insert(sensor.name, sensor.id);
    }

    Ok(Topology {
        asset_id: asset.id,
        sensor_ids,
    })
}
