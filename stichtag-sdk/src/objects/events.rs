//! Event request and response types.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of an event, including who currently holds a seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub event_id: Uuid,
    pub title: String,
    pub event_date: time::Date,
    pub starts_at: Option<time::Time>,
    pub ends_at: Option<time::Time>,
    pub description: String,
    pub capacity: i32,
    pub deadline: Option<time::Date>,
    pub organizer_name: Option<String>,
    pub organizer_email: Option<String>,
    pub reward_score: i32,
    /// Whether the post-deadline draw already ran for this event.
    pub deadline_notified: bool,
    pub participants: Vec<CompactString>,
}

/// Request body for creating an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub event_date: time::Date,
    #[serde(default)]
    pub starts_at: Option<time::Time>,
    #[serde(default)]
    pub ends_at: Option<time::Time>,
    #[serde(default)]
    pub description: String,
    pub capacity: i32,
    #[serde(default)]
    pub deadline: Option<time::Date>,
    #[serde(default)]
    pub organizer_name: Option<String>,
    #[serde(default)]
    pub organizer_email: Option<String>,
    #[serde(default)]
    pub reward_score: i32,
}

/// Request body for replacing an event's data.
///
/// There is intentionally no way to touch the draw flag from here; that
/// flag only moves when a sweep completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: String,
    pub event_date: time::Date,
    #[serde(default)]
    pub starts_at: Option<time::Time>,
    #[serde(default)]
    pub ends_at: Option<time::Time>,
    #[serde(default)]
    pub description: String,
    pub capacity: i32,
    #[serde(default)]
    pub deadline: Option<time::Date>,
    #[serde(default)]
    pub organizer_name: Option<String>,
    #[serde(default)]
    pub organizer_email: Option<String>,
    #[serde(default)]
    pub reward_score: i32,
}
