//! Postgres store backend.
//!
//! Capacity and duplicate checks run inside a transaction that locks the
//! event row (`SELECT ... FOR UPDATE`), so concurrent enrollments for the
//! same event serialize at the database. The unique key on
//! `(event_id, username)` and the foreign keys backstop the checks.

use super::{Store, StoreError};
use crate::entities::enrollments::EnrollmentRecord;
use crate::entities::event_records::{EventInsert, EventRecord, EventUpdate};
use crate::entities::user_records::{UserInsert, UserRecord, UserUpdate};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        username        TEXT PRIMARY KEY,
        password_hash   TEXT NOT NULL,
        role            TEXT NOT NULL,
        email           TEXT,
        active          BOOLEAN NOT NULL DEFAULT TRUE,
        score           INTEGER NOT NULL DEFAULT 0,
        created_at      TIMESTAMP NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS events (
        event_id            UUID PRIMARY KEY,
        title               TEXT NOT NULL,
        event_date          DATE NOT NULL,
        starts_at           TIME,
        ends_at             TIME,
        description         TEXT NOT NULL DEFAULT '',
        capacity            INTEGER NOT NULL,
        deadline            DATE,
        organizer_name      TEXT,
        organizer_email     TEXT,
        reward_score        INTEGER NOT NULL DEFAULT 0,
        deadline_notified   BOOLEAN NOT NULL DEFAULT FALSE,
        created_at          TIMESTAMP NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS enrollments (
        event_id        UUID NOT NULL REFERENCES events (event_id) ON DELETE CASCADE,
        username        TEXT NOT NULL REFERENCES users (username) ON DELETE CASCADE,
        enrolled_at     TIMESTAMP NOT NULL DEFAULT now(),
        PRIMARY KEY (event_id, username)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS events_due_idx
        ON events (deadline) WHERE deadline_notified = FALSE
    "#,
];

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"))
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the embedded schema. Every statement is idempotent, so this
    /// is safe to run on every start when `--migrate` is passed.
    #[tracing::instrument(skip_all, err, name = "SQL:migrate")]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in MIGRATIONS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    #[tracing::instrument(skip_all, err, name = "SQL:insert_event")]
    async fn insert_event(&self, event: EventInsert) -> Result<EventRecord, StoreError> {
        let record = sqlx::query_as::<_, EventRecord>(
            r#"
            INSERT INTO events
                (event_id, title, event_date, starts_at, ends_at, description,
                 capacity, deadline, organizer_name, organizer_email, reward_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&event.title)
        .bind(event.event_date)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(&event.description)
        .bind(event.capacity)
        .bind(event.deadline)
        .bind(&event.organizer_name)
        .bind(&event.organizer_email)
        .bind(event.reward_score)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:get_event")]
    async fn get_event(&self, event_id: Uuid) -> Result<Option<EventRecord>, StoreError> {
        let record = sqlx::query_as::<_, EventRecord>("SELECT * FROM events WHERE event_id = $1")
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:list_events")]
    async fn list_events(&self) -> Result<Vec<EventRecord>, StoreError> {
        let records =
            sqlx::query_as::<_, EventRecord>("SELECT * FROM events ORDER BY event_date, created_at")
                .fetch_all(&self.pool)
                .await?;
        Ok(records)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:update_event")]
    async fn update_event(
        &self,
        event_id: Uuid,
        update: EventUpdate,
    ) -> Result<EventRecord, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query_as::<_, EventRecord>("SELECT * FROM events WHERE event_id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::EventNotFound)?;
        let enrolled: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&mut *tx)
                .await?;
        if i64::from(update.capacity) < enrolled {
            return Err(StoreError::CapacityExceeded);
        }
        let record = sqlx::query_as::<_, EventRecord>(
            r#"
            UPDATE events SET
                title = $2, event_date = $3, starts_at = $4, ends_at = $5,
                description = $6, capacity = $7, deadline = $8,
                organizer_name = $9, organizer_email = $10, reward_score = $11
            WHERE event_id = $1
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(&update.title)
        .bind(update.event_date)
        .bind(update.starts_at)
        .bind(update.ends_at)
        .bind(&update.description)
        .bind(update.capacity)
        .bind(update.deadline)
        .bind(&update.organizer_name)
        .bind(&update.organizer_email)
        .bind(update.reward_score)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(record)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:delete_event")]
    async fn delete_event(&self, event_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:insert_user")]
    async fn insert_user(&self, user: UserInsert) -> Result<UserRecord, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (username, password_hash, role, email, active, score)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user.username.as_str())
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.email)
        .bind(user.active)
        .bind(user.score)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::UserExists
            } else {
                StoreError::Database(e)
            }
        })?;
        Ok(record)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:get_user")]
    async fn get_user(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:list_users")]
    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        let records = sqlx::query_as::<_, UserRecord>("SELECT * FROM users ORDER BY username")
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:update_user")]
    async fn update_user(
        &self,
        username: &str,
        update: UserUpdate,
    ) -> Result<UserRecord, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET
                password_hash = COALESCE($2, password_hash),
                email = $3, role = $4, active = $5, score = $6
            WHERE username = $1
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(&update.password_hash)
        .bind(&update.email)
        .bind(update.role.as_str())
        .bind(update.active)
        .bind(update.score)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::UserNotFound)?;
        Ok(record)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:delete_user")]
    async fn delete_user(&self, username: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:active_users")]
    async fn active_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        let records =
            sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE active ORDER BY username")
                .fetch_all(&self.pool)
                .await?;
        Ok(records)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:enroll")]
    async fn enroll(
        &self,
        event_id: Uuid,
        username: &str,
    ) -> Result<EnrollmentRecord, StoreError> {
        let mut tx = self.pool.begin().await?;
        // 1. Lock the event row so capacity checks serialize per event.
        let event = sqlx::query_as::<_, EventRecord>(
            "SELECT * FROM events WHERE event_id = $1 FOR UPDATE",
        )
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::EventNotFound)?;
        // 2. Duplicate membership is a conflict, not a no-op.
        let already: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE event_id = $1 AND username = $2)",
        )
        .bind(event_id)
        .bind(username)
        .fetch_one(&mut *tx)
        .await?;
        if already {
            return Err(StoreError::AlreadyEnrolled);
        }
        // 3. Capacity check under the lock.
        let enrolled: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&mut *tx)
                .await?;
        if enrolled >= i64::from(event.capacity) {
            return Err(StoreError::CapacityExceeded);
        }
        // 4. Insert; the unique key and user FK backstop the checks above.
        let record = sqlx::query_as::<_, EnrollmentRecord>(
            "INSERT INTO enrollments (event_id, username) VALUES ($1, $2) RETURNING *",
        )
        .bind(event_id)
        .bind(username)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::AlreadyEnrolled
            } else if is_foreign_key_violation(&e) {
                StoreError::UserNotFound
            } else {
                StoreError::Database(e)
            }
        })?;
        // 5. Credit the reward score in the same transaction.
        if event.reward_score > 0 {
            sqlx::query("UPDATE users SET score = score + $2 WHERE username = $1")
                .bind(username)
                .bind(event.reward_score)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(record)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:withdraw")]
    async fn withdraw(&self, event_id: Uuid, username: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM events WHERE event_id = $1)")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(StoreError::EventNotFound);
        }
        let result =
            sqlx::query("DELETE FROM enrollments WHERE event_id = $1 AND username = $2")
                .bind(event_id)
                .bind(username)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:enrollments_for_event")]
    async fn enrollments_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<EnrollmentRecord>, StoreError> {
        let records = sqlx::query_as::<_, EnrollmentRecord>(
            "SELECT * FROM enrollments WHERE event_id = $1 ORDER BY enrolled_at",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:due_events")]
    async fn due_events(&self, today: time::Date) -> Result<Vec<EventRecord>, StoreError> {
        let records = sqlx::query_as::<_, EventRecord>(
            "SELECT * FROM events WHERE deadline = $1 AND deadline_notified = FALSE",
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:mark_deadline_notified")]
    async fn mark_deadline_notified(&self, event_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE events SET deadline_notified = TRUE WHERE event_id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::EventNotFound);
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, err, name = "SQL:ping")]
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
