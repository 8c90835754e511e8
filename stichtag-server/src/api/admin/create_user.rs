use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use stichtag_core::entities::user_records::UserInsert;
use stichtag_sdk::objects::users::CreateUserRequest;

use crate::api::extractors::AdminUser;
use crate::api::user_to_response;
use crate::password;
use crate::state::AppState;

use super::AdminApiError;

/// `POST /users` – create a user account. The password arrives in
/// plaintext and is hashed before it touches the store.
pub async fn create_user(
    state: State<AppState>,
    _admin: AdminUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    if request.username.trim().is_empty() {
        return Err(AdminApiError::Validation("username must not be empty"));
    }
    if request.password.is_empty() {
        return Err(AdminApiError::Validation("password must not be empty"));
    }

    let password_hash =
        password::hash_password(&request.password).map_err(|_| AdminApiError::Hash)?;

    let record = state
        .store
        .insert_user(UserInsert {
            username: request.username,
            password_hash,
            role: request.role.into(),
            email: request.email,
            active: request.active,
            score: request.score,
        })
        .await?;

    tracing::info!(username = %record.username, role = %record.role, "User account created");
    Ok((StatusCode::CREATED, Json(user_to_response(&record))))
}
