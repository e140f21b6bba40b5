//! Domain types and pure logic for the predictive-maintenance pipeline.
//!
//! Nothing in this crate touches the database or the filesystem; randomness
//! comes from RNGs passed in by the caller.

pub mod accuracy;
pub mod error;
pub mod features;
pub mod metrics;
pub mod noise;
pub mod regression;
pub mod sensor;
pub mod simulator;
pub mod stats;
pub mod synthetic;
pub mod thresholds;
pub mod types;
pub mod validation;
