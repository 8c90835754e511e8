//! Enrollment request and response types.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery outcome of the best-effort notification attached to a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Sent,
    Failed,
    Skipped,
}

/// Response for a successful enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollResponse {
    pub event_id: Uuid,
    pub username: CompactString,
    pub notification: NotificationStatus,
}

/// Response for a withdrawal.
///
/// `withdrawn` is false when there was no seat to release; the request
/// still succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawResponse {
    pub event_id: Uuid,
    pub username: CompactString,
    pub withdrawn: bool,
}
