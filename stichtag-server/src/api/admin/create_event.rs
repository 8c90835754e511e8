use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use stichtag_core::entities::event_records::EventInsert;
use stichtag_sdk::objects::events::CreateEventRequest;

use crate::api::event_to_response;
use crate::api::extractors::AdminUser;
use crate::state::AppState;

use super::AdminApiError;

/// `POST /events` – create an event. Starts with no participants and the
/// draw flag unset.
pub async fn create_event(
    state: State<AppState>,
    _admin: AdminUser,
    Json(request): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    if request.title.trim().is_empty() {
        return Err(AdminApiError::Validation("title must not be empty"));
    }
    if request.capacity < 1 {
        return Err(AdminApiError::Validation("capacity must be at least 1"));
    }
    if request.reward_score < 0 {
        return Err(AdminApiError::Validation("reward_score must not be negative"));
    }

    let record = state
        .store
        .insert_event(EventInsert {
            title: request.title,
            event_date: request.event_date,
            starts_at: request.starts_at,
            ends_at: request.ends_at,
            description: request.description,
            capacity: request.capacity,
            deadline: request.deadline,
            organizer_name: request.organizer_name,
            organizer_email: request.organizer_email,
            reward_score: request.reward_score,
        })
        .await?;

    tracing::info!(event_id = %record.event_id, title = %record.title, "Event created");
    Ok((StatusCode::CREATED, Json(event_to_response(&record, Vec::new()))))
}
