use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EventRecord {
    pub event_id: Uuid,
    pub title: String,
    pub event_date: time::Date,
    pub starts_at: Option<time::Time>,
    pub ends_at: Option<time::Time>,
    pub description: String,
    pub capacity: i32,
    pub deadline: Option<time::Date>,
    pub organizer_name: Option<String>,
    pub organizer_email: Option<String>,
    pub reward_score: i32,
    /// Transitions false → true exactly once, after a completed sweep pass.
    pub deadline_notified: bool,
    pub created_at: time::PrimitiveDateTime,
}

impl EventRecord {
    /// Seats still open given the current enrollment count.
    pub fn free_seats(&self, enrolled: usize) -> usize {
        (self.capacity as i64 - enrolled as i64).max(0) as usize
    }
}

/// Data for creating a new event.
#[derive(Debug, Clone)]
pub struct EventInsert {
    pub title: String,
    pub event_date: time::Date,
    pub starts_at: Option<time::Time>,
    pub ends_at: Option<time::Time>,
    pub description: String,
    pub capacity: i32,
    pub deadline: Option<time::Date>,
    pub organizer_name: Option<String>,
    pub organizer_email: Option<String>,
    pub reward_score: i32,
}

/// Replacement values for an event edit.
///
/// Deliberately has no `deadline_notified` field: the flag is owned by the
/// sweep pass and never editable.
#[derive(Debug, Clone)]
pub struct EventUpdate {
    pub title: String,
    pub event_date: time::Date,
    pub starts_at: Option<time::Time>,
    pub ends_at: Option<time::Time>,
    pub description: String,
    pub capacity: i32,
    pub deadline: Option<time::Date>,
    pub organizer_name: Option<String>,
    pub organizer_email: Option<String>,
    pub reward_score: i32,
}
