//! Deadline sweep request and response types.

use serde::{Deserialize, Serialize};

/// Request body for manually triggering a sweep.
///
/// `date` defaults to today (UTC) when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSweepRequest {
    #[serde(default)]
    pub date: Option<time::Date>,
}

/// Counters reported after a sweep pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SweepReportResponse {
    pub events_processed: u32,
    pub events_failed: u32,
    pub seats_filled: u32,
    pub notifications_sent: u32,
    pub notifications_failed: u32,
}
