use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::api::extractors::AdminUser;
use crate::state::AppState;

use super::AdminApiError;

/// `DELETE /users/{username}` – delete a user account along with every
/// seat it holds.
pub async fn delete_user(
    state: State<AppState>,
    _admin: AdminUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AdminApiError> {
    if state.store.delete_user(&username).await? {
        tracing::info!(username = %username, "User account deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AdminApiError::NotFound)
    }
}
