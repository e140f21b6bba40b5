//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the table row, a create DTO for inserts, and any joined read models the
//! dashboard queries return.

pub mod alert;
pub mod asset;
pub mod prediction;
pub mod reading;
pub mod sensor;
pub mod stats;
