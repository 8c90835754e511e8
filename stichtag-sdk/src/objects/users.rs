//! User account request and response types.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Account role. Transmitted and stored in lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

/// Public view of a user account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: CompactString,
    pub email: Option<String>,
    pub role: Role,
    pub active: bool,
    pub score: i32,
}

/// Request body for creating a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: CompactString,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub score: i32,
}

fn default_role() -> Role {
    Role::Member
}

fn default_active() -> bool {
    true
}

/// Request body for an admin updating a user account.
///
/// `password` absent keeps the current password. `email` is the full new
/// value; absent clears it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    pub active: bool,
    pub score: i32,
}

/// Request body for a user updating their own profile.
///
/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeUpdateRequest {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
