//! Admin API handlers.
//!
//! Every endpoint here requires an access token whose role is `admin`.
//!
//! # Endpoints
//!
//! - `GET /users` – list user accounts
//! - `POST /users` – create a user account
//! - `PUT /users/{username}` – update a user account
//! - `DELETE /users/{username}` – delete a user account and its seats
//! - `POST /events` – create an event
//! - `PUT /events/{event_id}` – update an event
//! - `DELETE /events/{event_id}` – delete an event and its seats
//! - `POST /sweep` – run the deadline sweep now

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use stichtag_core::store::StoreError;

use crate::state::AppState;

mod create_event;
mod create_user;
mod delete_event;
mod delete_user;
mod list_users;
mod run_sweep;
mod update_event;
mod update_user;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(list_users::list_users).post(create_user::create_user),
        )
        .route(
            "/users/{username}",
            put(update_user::update_user).delete(delete_user::delete_user),
        )
        .route("/events", post(create_event::create_event))
        .route(
            "/events/{event_id}",
            put(update_event::update_event).delete(delete_event::delete_event),
        )
        .route("/sweep", post(run_sweep::run_sweep))
}

/// Errors that can occur in Admin API handlers.
#[derive(Debug)]
pub(crate) enum AdminApiError {
    NotFound,
    Conflict(&'static str),
    Validation(&'static str),
    Hash,
    Storage(StoreError),
}

impl From<StoreError> for AdminApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EventNotFound | StoreError::UserNotFound => Self::NotFound,
            StoreError::UserExists => Self::Conflict("username already taken"),
            StoreError::AlreadyEnrolled => Self::Conflict("already enrolled"),
            StoreError::CapacityExceeded => {
                Self::Conflict("capacity below current enrollment count")
            }
            other => Self::Storage(other),
        }
    }
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> Response {
        match self {
            AdminApiError::NotFound => {
                (StatusCode::NOT_FOUND, "resource not found").into_response()
            }
            AdminApiError::Conflict(message) => (StatusCode::CONFLICT, message).into_response(),
            AdminApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, message).into_response()
            }
            AdminApiError::Hash => {
                tracing::error!("Password hashing failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AdminApiError::Storage(e) => {
                tracing::error!(error = %e, "Admin API storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
