//! Member-facing event handlers.
//!
//! # Endpoints
//!
//! - `GET /events` – list all events with participants (public)
//! - `GET /events/{event_id}` – a single event (public)
//! - `POST /events/{event_id}/enroll` – take a seat (authenticated)
//! - `POST /events/{event_id}/withdraw` – release a seat (authenticated)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use stichtag_core::services::EnrollError;
use stichtag_core::store::StoreError;
use stichtag_sdk::objects::enroll::{EnrollResponse, WithdrawResponse};
use uuid::Uuid;

use crate::api::event_to_response;
use crate::api::extractors::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/{event_id}", get(get_event))
        .route("/events/{event_id}/enroll", post(enroll))
        .route("/events/{event_id}/withdraw", post(withdraw))
}

/// Errors that can occur in member API handlers.
#[derive(Debug)]
pub(crate) enum MemberApiError {
    NotFound,
    AlreadyEnrolled,
    CapacityExceeded,
    MissingContact,
    Storage(StoreError),
}

impl From<EnrollError> for MemberApiError {
    fn from(err: EnrollError) -> Self {
        match err {
            EnrollError::EventNotFound | EnrollError::UserNotFound => Self::NotFound,
            EnrollError::AlreadyEnrolled => Self::AlreadyEnrolled,
            EnrollError::CapacityExceeded => Self::CapacityExceeded,
            EnrollError::MissingContact => Self::MissingContact,
            EnrollError::Store(e) => Self::Storage(e),
        }
    }
}

impl From<StoreError> for MemberApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EventNotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}

impl IntoResponse for MemberApiError {
    fn into_response(self) -> Response {
        match self {
            MemberApiError::NotFound => {
                (StatusCode::NOT_FOUND, "resource not found").into_response()
            }
            MemberApiError::AlreadyEnrolled => {
                (StatusCode::CONFLICT, "already enrolled").into_response()
            }
            MemberApiError::CapacityExceeded => {
                (StatusCode::CONFLICT, "no free seats").into_response()
            }
            MemberApiError::MissingContact => {
                (StatusCode::BAD_REQUEST, "no contact address on file").into_response()
            }
            MemberApiError::Storage(e) => {
                tracing::error!(error = %e, "Member API storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}

/// `GET /events` – all events with their current participants.
async fn list_events(state: State<AppState>) -> Result<impl IntoResponse, MemberApiError> {
    let events = state.store.list_events().await?;
    let mut responses = Vec::with_capacity(events.len());
    for event in &events {
        let participants = state
            .store
            .enrollments_for_event(event.event_id)
            .await?
            .into_iter()
            .map(|enrollment| enrollment.username)
            .collect();
        responses.push(event_to_response(event, participants));
    }
    Ok(Json(responses))
}

/// `GET /events/{event_id}` – a single event with its participants.
async fn get_event(
    state: State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, MemberApiError> {
    let event = state
        .store
        .get_event(event_id)
        .await?
        .ok_or(MemberApiError::NotFound)?;
    let participants = state
        .store
        .enrollments_for_event(event_id)
        .await?
        .into_iter()
        .map(|enrollment| enrollment.username)
        .collect();
    Ok(Json(event_to_response(&event, participants)))
}

/// `POST /events/{event_id}/enroll` – take a seat on the event.
async fn enroll(
    state: State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, MemberApiError> {
    let receipt = state.enrollment.enroll(event_id, &user.username).await?;
    Ok(Json(EnrollResponse {
        event_id: receipt.event.event_id,
        username: user.username,
        notification: receipt.notification.into(),
    }))
}

/// `POST /events/{event_id}/withdraw` – release a held seat. Idempotent:
/// withdrawing without a seat reports `withdrawn: false`.
async fn withdraw(
    state: State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, MemberApiError> {
    let withdrawn = state.enrollment.withdraw(event_id, &user.username).await?;
    Ok(Json(WithdrawResponse {
        event_id,
        username: user.username,
        withdrawn,
    }))
}
