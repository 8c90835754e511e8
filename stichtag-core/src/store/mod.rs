//! Persistence abstraction for events, users and enrollments.
//!
//! The [`Store`] trait is the only seam the services talk through. Two
//! backends exist:
//! - [`PgStore`] — Postgres via sqlx, used in production
//! - [`MemoryStore`] — a single-mutex in-memory map, used by the dev server
//!   mode and by tests
//!
//! The capacity-sensitive operations (`enroll`, `update_event`) are atomic
//! per backend: Postgres serializes them with a row lock inside one
//! transaction, the memory backend with its single mutex.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::entities::enrollments::EnrollmentRecord;
use crate::entities::event_records::{EventInsert, EventRecord, EventUpdate};
use crate::entities::user_records::{UserInsert, UserRecord, UserUpdate};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors produced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referenced event does not exist
    #[error("event not found")]
    EventNotFound,

    /// Referenced user does not exist
    #[error("user not found")]
    UserNotFound,

    /// A user with that username already exists
    #[error("username already taken")]
    UserExists,

    /// The (event, username) pair is already enrolled
    #[error("already enrolled")]
    AlreadyEnrolled,

    /// The enrollment count has reached the event's capacity
    #[error("event is at capacity")]
    CapacityExceeded,

    /// Underlying database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Abstract persistence for the enrollment domain.
#[async_trait]
pub trait Store: Send + Sync {
    // -- events -------------------------------------------------------------

    async fn insert_event(&self, event: EventInsert) -> Result<EventRecord, StoreError>;

    async fn get_event(&self, event_id: Uuid) -> Result<Option<EventRecord>, StoreError>;

    async fn list_events(&self) -> Result<Vec<EventRecord>, StoreError>;

    /// Replace an event's editable fields.
    ///
    /// Fails with [`StoreError::CapacityExceeded`] if the new capacity is
    /// below the current enrollment count; the capacity invariant may not be
    /// broken retroactively.
    async fn update_event(
        &self,
        event_id: Uuid,
        update: EventUpdate,
    ) -> Result<EventRecord, StoreError>;

    /// Delete an event, cascading to its enrollments. Returns `false` if the
    /// event did not exist.
    async fn delete_event(&self, event_id: Uuid) -> Result<bool, StoreError>;

    // -- users --------------------------------------------------------------

    async fn insert_user(&self, user: UserInsert) -> Result<UserRecord, StoreError>;

    async fn get_user(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError>;

    async fn update_user(
        &self,
        username: &str,
        update: UserUpdate,
    ) -> Result<UserRecord, StoreError>;

    /// Delete a user, cascading to their enrollments. Returns `false` if the
    /// user did not exist.
    async fn delete_user(&self, username: &str) -> Result<bool, StoreError>;

    /// All users with `active = true`, the lottery's base pool.
    async fn active_users(&self) -> Result<Vec<UserRecord>, StoreError>;

    // -- enrollments --------------------------------------------------------

    /// Atomically enroll `username` into the event and credit the event's
    /// reward score to the user.
    ///
    /// The duplicate check, capacity check, insert and score credit happen
    /// under one lock scope, so concurrent callers can never observe
    /// `count < capacity` together and over-fill the event.
    async fn enroll(&self, event_id: Uuid, username: &str)
    -> Result<EnrollmentRecord, StoreError>;

    /// Remove an enrollment if present. Returns `true` when a seat was
    /// actually released; removing an absent enrollment is a no-op success.
    async fn withdraw(&self, event_id: Uuid, username: &str) -> Result<bool, StoreError>;

    async fn enrollments_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<EnrollmentRecord>, StoreError>;

    // -- sweep --------------------------------------------------------------

    /// Events whose deadline is `today` and whose notification flag is still
    /// unset.
    async fn due_events(&self, today: time::Date) -> Result<Vec<EventRecord>, StoreError>;

    /// Set the `deadline_notified` flag. The flag only ever goes false → true.
    async fn mark_deadline_notified(&self, event_id: Uuid) -> Result<(), StoreError>;

    // -- health -------------------------------------------------------------

    async fn ping(&self) -> Result<(), StoreError>;
}
