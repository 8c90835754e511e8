//! Authentication and own-profile handlers.
//!
//! # Endpoints
//!
//! - `POST /auth/login` – exchange credentials for an access token
//! - `GET /me` – the caller's own account
//! - `PUT /me` – update own password and/or email

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use stichtag_core::entities::user_records::UserUpdate;
use stichtag_core::store::StoreError;
use stichtag_sdk::objects::auth::{LoginRequest, TokenResponse};
use stichtag_sdk::objects::users::MeUpdateRequest;
use stichtag_sdk::token;

use crate::api::extractors::AuthUser;
use crate::api::user_to_response;
use crate::password;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/me", get(me).put(update_me))
}

/// Errors that can occur in authentication and profile handlers.
#[derive(Debug)]
pub(crate) enum AuthApiError {
    /// Unknown username or wrong password. One indistinct message for
    /// both, so login attempts cannot probe which usernames exist.
    BadCredentials,
    /// The account exists, the password matched, but the account is off.
    Deactivated,
    NotFound,
    Hash,
    TokenIssue,
    Storage(StoreError),
}

impl From<StoreError> for AuthApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserNotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        match self {
            AuthApiError::BadCredentials => {
                (StatusCode::UNAUTHORIZED, "invalid username or password").into_response()
            }
            AuthApiError::Deactivated => {
                (StatusCode::FORBIDDEN, "account is deactivated").into_response()
            }
            AuthApiError::NotFound => {
                (StatusCode::NOT_FOUND, "resource not found").into_response()
            }
            AuthApiError::Hash => {
                tracing::error!("Password hashing failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AuthApiError::TokenIssue => {
                tracing::error!("Failed to issue access token");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AuthApiError::Storage(e) => {
                tracing::error!(error = %e, "Auth API storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}

/// `POST /auth/login` – exchange username and password for an access token.
async fn login(
    state: State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthApiError> {
    let user = state
        .store
        .get_user(&request.username)
        .await?
        .ok_or(AuthApiError::BadCredentials)?;

    if !user.active {
        return Err(AuthApiError::Deactivated);
    }
    if !password::verify_password(&request.password, &user.password_hash) {
        return Err(AuthApiError::BadCredentials);
    }

    let auth = state.config.auth.read().await;
    let (token, expires_at) = token::issue(
        &user.username,
        user.role.into(),
        auth.token_ttl_minutes,
        auth.secret_bytes(),
    )
    .map_err(|_| AuthApiError::TokenIssue)?;
    drop(auth);

    tracing::info!(username = %user.username, "Login successful");
    Ok(Json(TokenResponse {
        token,
        username: user.username.to_string(),
        role: user.role.into(),
        expires_at,
    }))
}

/// `GET /me` – the caller's own account.
async fn me(state: State<AppState>, user: AuthUser) -> Result<impl IntoResponse, AuthApiError> {
    let record = state
        .store
        .get_user(&user.username)
        .await?
        .ok_or(AuthApiError::NotFound)?;
    Ok(Json(user_to_response(&record)))
}

/// `PUT /me` – update own password and/or email. Absent fields keep
/// their current value; role, active flag and score are not reachable
/// from here.
async fn update_me(
    state: State<AppState>,
    user: AuthUser,
    Json(request): Json<MeUpdateRequest>,
) -> Result<impl IntoResponse, AuthApiError> {
    let record = state
        .store
        .get_user(&user.username)
        .await?
        .ok_or(AuthApiError::NotFound)?;

    let password_hash = match request.password.as_deref() {
        Some(plaintext) if !plaintext.is_empty() => {
            Some(password::hash_password(plaintext).map_err(|_| AuthApiError::Hash)?)
        }
        _ => None,
    };

    let updated = state
        .store
        .update_user(
            &user.username,
            UserUpdate {
                password_hash,
                email: request.email.or(record.email),
                role: record.role,
                active: record.active,
                score: record.score,
            },
        )
        .await?;

    tracing::info!(username = %user.username, "Profile updated");
    Ok(Json(user_to_response(&updated)))
}
