use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::api::extractors::AdminUser;
use crate::api::user_to_response;
use crate::state::AppState;

use super::AdminApiError;

/// `GET /users` – list all user accounts.
pub async fn list_users(
    state: State<AppState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AdminApiError> {
    let users = state.store.list_users().await?;
    let responses: Vec<_> = users.iter().map(user_to_response).collect();
    Ok(Json(responses))
}
