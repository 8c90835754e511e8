//! HTTP API handlers.

pub mod extractors;

mod admin;
mod auth;
mod member;

#[cfg(test)]
mod tests;

use axum::Router;
use compact_str::CompactString;
use stichtag_core::entities::event_records::EventRecord;
use stichtag_core::entities::user_records::UserRecord;
use stichtag_sdk::objects::events::EventResponse;
use stichtag_sdk::objects::users::UserResponse;

use crate::state::AppState;

/// Build the `/api` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(member::router())
        .nest("/admin", admin::router())
}

// ---------------------------------------------------------------------------
// Conversion helpers (DB model -> API model)
// ---------------------------------------------------------------------------

/// Convert a `UserRecord` into its API shape. The password hash never
/// leaves the server.
pub(crate) fn user_to_response(record: &UserRecord) -> UserResponse {
    UserResponse {
        username: record.username.clone(),
        email: record.email.clone(),
        role: record.role.into(),
        active: record.active,
        score: record.score,
    }
}

/// Convert an `EventRecord` plus its participant list into the public
/// event shape.
pub(crate) fn event_to_response(
    record: &EventRecord,
    participants: Vec<CompactString>,
) -> EventResponse {
    EventResponse {
        event_id: record.event_id,
        title: record.title.clone(),
        event_date: record.event_date,
        starts_at: record.starts_at,
        ends_at: record.ends_at,
        description: record.description.clone(),
        capacity: record.capacity,
        deadline: record.deadline,
        organizer_name: record.organizer_name.clone(),
        organizer_email: record.organizer_email.clone(),
        reward_score: record.reward_score,
        deadline_notified: record.deadline_notified,
        participants,
    }
}
