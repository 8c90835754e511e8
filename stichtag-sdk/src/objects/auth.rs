//! Authentication request and response types.

use serde::{Deserialize, Serialize};

use super::users::Role;

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response carrying a freshly issued access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub username: String,
    pub role: Role,
    /// Unix timestamp the token stops being valid at.
    pub expires_at: i64,
}
