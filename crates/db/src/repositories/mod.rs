//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&SqlitePool` as the first argument.

pub mod alert_repo;
pub mod asset_repo;
pub mod prediction_repo;
pub mod reading_repo;
pub mod sensor_repo;
pub mod stats_repo;

pub use alert_repo::AlertRepo;
pub use asset_repo::AssetRepo;
pub use prediction_repo::PredictionRepo;
pub use reading_repo::ReadingRepo;
pub use sensor_repo::SensorRepo;
pub use stats_repo::StatsRepo;
