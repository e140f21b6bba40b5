pub mod alerts;
pub mod predictions;
pub mod readings;
pub mod sensors;
pub mod stats;
