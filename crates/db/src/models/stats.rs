//! Database-wide counters.

use predmaint_core::types::Timestamp;
use serde::Serialize;

/// Row counts per table plus the newest reading timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatabaseStats {
    pub assets: i64,
    pub sensors: i64,
    pub readings: i64,
    pub alerts: i64,
    pub active_alerts: i64,
    pub predictions: i64,
    pub last_reading_at: Option<Timestamp>,
}
