use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use stichtag_core::entities::user_records::UserUpdate;
use stichtag_sdk::objects::users::UpdateUserRequest;

use crate::api::extractors::AdminUser;
use crate::api::user_to_response;
use crate::password;
use crate::state::AppState;

use super::AdminApiError;

/// `PUT /users/{username}` – replace a user account's data. A present
/// `password` field sets a new password; absent keeps the current hash.
pub async fn update_user(
    state: State<AppState>,
    _admin: AdminUser,
    Path(username): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    let password_hash = match request.password.as_deref() {
        Some(plaintext) if !plaintext.is_empty() => {
            Some(password::hash_password(plaintext).map_err(|_| AdminApiError::Hash)?)
        }
        Some(_) => return Err(AdminApiError::Validation("password must not be empty")),
        None => None,
    };

    let record = state
        .store
        .update_user(
            &username,
            UserUpdate {
                password_hash,
                email: request.email,
                role: request.role.into(),
                active: request.active,
                score: request.score,
            },
        )
        .await?;

    tracing::info!(username = %record.username, "User account updated");
    Ok(Json(user_to_response(&record)))
}
