//! Custom Axum extractors for request authentication.
//!
//! Provides:
//! - [`AuthUser`] – verifies the `Authorization: Bearer` access token and
//!   carries the caller's username and role.
//! - [`AdminUser`] – same, additionally requiring the admin role.
//!
//! Token parsing and signature checks are delegated to
//! [`stichtag_sdk::token`]; the signing secret comes from the shared
//! runtime configuration, so a SIGHUP rotation applies to the next
//! request.

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use compact_str::CompactString;
use stichtag_sdk::objects::users::Role;
use stichtag_sdk::token::{self, TokenError};

use crate::state::AppState;

/// An authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: CompactString,
    pub role: Role,
}

/// Errors that can occur during request authentication.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingToken,

    #[error("invalid access token")]
    InvalidToken,

    #[error("access token expired")]
    Expired,

    #[error("admin role required")]
    Forbidden,
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::Expired,
            _ => Self::InvalidToken,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "missing Authorization header"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid access token"),
            AuthError::Expired => (StatusCode::UNAUTHORIZED, "access token expired"),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "admin role required"),
        };
        (status, message).into_response()
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?;
        let bearer = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let auth = state.config.auth.read().await;
        let claims = token::verify(bearer, auth.secret_bytes())?;

        Ok(AuthUser {
            username: claims.sub,
            role: claims.role,
        })
    }
}

/// An authenticated caller holding the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            return Err(AuthError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
