pub mod enrollments;
pub mod event_records;
pub mod user_records;

use stichtag_sdk::objects::users::Role as SdkRole;
use thiserror::Error;

/// User role for database operations.
///
/// This is the storage-side version, kept as TEXT in the schema. For API/DTO
/// use, see `stichtag_sdk::objects::users::Role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error produced when a stored role value is not a known variant.
#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(String);

impl TryFrom<String> for Role {
    type Error = RoleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            _ => Err(RoleParseError(value)),
        }
    }
}

impl From<Role> for SdkRole {
    fn from(value: Role) -> Self {
        match value {
            Role::Admin => SdkRole::Admin,
            Role::Member => SdkRole::Member,
        }
    }
}

impl From<SdkRole> for Role {
    fn from(value: SdkRole) -> Self {
        match value {
            SdkRole::Admin => Role::Admin,
            SdkRole::Member => Role::Member,
        }
    }
}
