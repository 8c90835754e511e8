use crate::entities::Role;
use compact_str::CompactString;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub username: CompactString,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub email: Option<String>,
    pub active: bool,
    pub score: i32,
    pub created_at: time::PrimitiveDateTime,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct UserInsert {
    pub username: CompactString,
    pub password_hash: String,
    pub role: Role,
    pub email: Option<String>,
    pub active: bool,
    pub score: i32,
}

/// Replacement values for a user edit.
///
/// `password_hash` is `None` to keep the current hash. `email` is the full
/// new value (`None` clears it). Score edits go through here too, the only
/// place besides enrollment crediting that may change a score.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    pub active: bool,
    pub score: i32,
}
