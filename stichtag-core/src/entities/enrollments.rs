use compact_str::CompactString;
use uuid::Uuid;

/// A membership fact: one seat held by one user in one event.
///
/// At most one row may exist per `(event_id, username)` pair; the store
/// enforces this and rejects duplicates rather than ignoring them.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EnrollmentRecord {
    pub event_id: Uuid,
    pub username: CompactString,
    pub enrolled_at: time::PrimitiveDateTime,
}
