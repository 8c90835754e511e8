use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use stichtag_core::entities::event_records::EventUpdate;
use stichtag_sdk::objects::events::UpdateEventRequest;
use uuid::Uuid;

use crate::api::event_to_response;
use crate::api::extractors::AdminUser;
use crate::state::AppState;

use super::AdminApiError;

/// `PUT /events/{event_id}` – replace an event's data. Shrinking the
/// capacity below the current enrollment count is a conflict; nobody
/// loses a seat through an edit.
pub async fn update_event(
    state: State<AppState>,
    _admin: AdminUser,
    Path(event_id): Path<Uuid>,
    Json(request): Json<UpdateEventRequest>,
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
        .update_event(
            event_id,
            EventUpdate {
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
            },
        )
        .await?;

    let participants = state
        .store
        .enrollments_for_event(event_id)
        .await?
        .into_iter()
        .map(|enrollment| enrollment.username)
        .collect();

    tracing::info!(event_id = %record.event_id, "Event updated");
    Ok(Json(event_to_response(&record, participants)))
}
