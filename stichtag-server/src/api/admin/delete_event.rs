use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::api::extractors::AdminUser;
use crate::state::AppState;

use super::AdminApiError;

/// `DELETE /events/{event_id}` – delete an event along with all of its
/// enrollments.
pub async fn delete_event(
    state: State<AppState>,
    _admin: AdminUser,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, AdminApiError> {
    if state.store.delete_event(event_id).await? {
        tracing::info!(event_id = %event_id, "Event deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AdminApiError::NotFound)
    }
}
