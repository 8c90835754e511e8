//! In-memory store backend.
//!
//! Holds everything behind one async mutex, which trivially serializes the
//! check-then-act sequences (capacity check + insert) that the Postgres
//! backend serializes with row locks. Used by `--in-memory` server mode and
//! by the test suites.

use super::{Store, StoreError};
use crate::entities::enrollments::EnrollmentRecord;
use crate::entities::event_records::{EventInsert, EventRecord, EventUpdate};
use crate::entities::user_records::{UserInsert, UserRecord, UserUpdate};
use async_trait::async_trait;
use compact_str::CompactString;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    events: HashMap<Uuid, EventRecord>,
    users: HashMap<CompactString, UserRecord>,
    enrollments: Vec<EnrollmentRecord>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn now() -> time::PrimitiveDateTime {
    let now = time::OffsetDateTime::now_utc();
    time::PrimitiveDateTime::new(now.date(), now.time())
}

impl Inner {
    fn enrollment_count(&self, event_id: Uuid) -> usize {
        self.enrollments
            .iter()
            .filter(|e| e.event_id == event_id)
            .count()
    }

    fn is_enrolled(&self, event_id: Uuid, username: &str) -> bool {
        self.enrollments
            .iter()
            .any(|e| e.event_id == event_id && e.username == username)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_event(&self, event: EventInsert) -> Result<EventRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        let record = EventRecord {
            event_id: Uuid::new_v4(),
            title: event.title,
            event_date: event.event_date,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            description: event.description,
            capacity: event.capacity,
            deadline: event.deadline,
            organizer_name: event.organizer_name,
            organizer_email: event.organizer_email,
            reward_score: event.reward_score,
            deadline_notified: false,
            created_at: now(),
        };
        inner.events.insert(record.event_id, record.clone());
        Ok(record)
    }

    async fn get_event(&self, event_id: Uuid) -> Result<Option<EventRecord>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.events.get(&event_id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<EventRecord>, StoreError> {
        let inner = self.inner.lock().await;
        let mut events: Vec<_> = inner.events.values().cloned().collect();
        events.sort_by(|a, b| a.event_date.cmp(&b.event_date));
        Ok(events)
    }

    async fn update_event(
        &self,
        event_id: Uuid,
        update: EventUpdate,
    ) -> Result<EventRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        let enrolled = inner.enrollment_count(event_id);
        let record = inner
            .events
            .get_mut(&event_id)
            .ok_or(StoreError::EventNotFound)?;
        if (update.capacity as usize) < enrolled {
            return Err(StoreError::CapacityExceeded);
        }
        record.title = update.title;
        record.event_date = update.event_date;
        record.starts_at = update.starts_at;
        record.ends_at = update.ends_at;
        record.description = update.description;
        record.capacity = update.capacity;
        record.deadline = update.deadline;
        record.organizer_name = update.organizer_name;
        record.organizer_email = update.organizer_email;
        record.reward_score = update.reward_score;
        Ok(record.clone())
    }

    async fn delete_event(&self, event_id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let removed = inner.events.remove(&event_id).is_some();
        if removed {
            inner.enrollments.retain(|e| e.event_id != event_id);
        }
        Ok(removed)
    }

    async fn insert_user(&self, user: UserInsert) -> Result<UserRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.users.contains_key(&user.username) {
            return Err(StoreError::UserExists);
        }
        let record = UserRecord {
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            email: user.email,
            active: user.active,
            score: user.score,
            created_at: now(),
        };
        inner.users.insert(record.username.clone(), record.clone());
        Ok(record)
    }

    async fn get_user(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.get(username).cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        let inner = self.inner.lock().await;
        let mut users: Vec<_> = inner.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn update_user(
        &self,
        username: &str,
        update: UserUpdate,
    ) -> Result<UserRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        let record = inner
            .users
            .get_mut(username)
            .ok_or(StoreError::UserNotFound)?;
        if let Some(hash) = update.password_hash {
            record.password_hash = hash;
        }
        record.email = update.email;
        record.role = update.role;
        record.active = update.active;
        record.score = update.score;
        Ok(record.clone())
    }

    async fn delete_user(&self, username: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let removed = inner.users.remove(username).is_some();
        if removed {
            inner.enrollments.retain(|e| e.username != username);
        }
        Ok(removed)
    }

    async fn active_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        let inner = self.inner.lock().await;
        let mut users: Vec<_> = inner
            .users
            .values()
            .filter(|u| u.active)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn enroll(
        &self,
        event_id: Uuid,
        username: &str,
    ) -> Result<EnrollmentRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        let event = inner
            .events
            .get(&event_id)
            .cloned()
            .ok_or(StoreError::EventNotFound)?;
        if inner.is_enrolled(event_id, username) {
            return Err(StoreError::AlreadyEnrolled);
        }
        if inner.enrollment_count(event_id) >= event.capacity as usize {
            return Err(StoreError::CapacityExceeded);
        }
        if !inner.users.contains_key(username) {
            return Err(StoreError::UserNotFound);
        }
        let record = EnrollmentRecord {
            event_id,
            username: CompactString::from(username),
            enrolled_at: now(),
        };
        inner.enrollments.push(record.clone());
        if event.reward_score > 0 {
            if let Some(user) = inner.users.get_mut(username) {
                user.score += event.reward_score;
            }
        }
        Ok(record)
    }

    async fn withdraw(&self, event_id: Uuid, username: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.events.contains_key(&event_id) {
            return Err(StoreError::EventNotFound);
        }
        let before = inner.enrollments.len();
        inner
            .enrollments
            .retain(|e| !(e.event_id == event_id && e.username == username));
        Ok(inner.enrollments.len() < before)
    }

    async fn enrollments_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<EnrollmentRecord>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .enrollments
            .iter()
            .filter(|e| e.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn due_events(&self, today: time::Date) -> Result<Vec<EventRecord>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .events
            .values()
            .filter(|e| e.deadline == Some(today) && !e.deadline_notified)
            .cloned()
            .collect())
    }

    async fn mark_deadline_notified(&self, event_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let record = inner
            .events
            .get_mut(&event_id)
            .ok_or(StoreError::EventNotFound)?;
        record.deadline_notified = true;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::Role;

    fn sample_event(capacity: i32, reward: i32) -> EventInsert {
        EventInsert {
            title: "Summer hike".to_string(),
            event_date: time::Date::from_calendar_date(2026, time::Month::September, 12).unwrap(),
            starts_at: None,
            ends_at: None,
            description: "Day trip".to_string(),
            capacity,
            deadline: None,
            organizer_name: None,
            organizer_email: None,
            reward_score: reward,
        }
    }

    fn sample_user(name: &str, score: i32) -> UserInsert {
        UserInsert {
            username: CompactString::from(name),
            password_hash: "x".to_string(),
            role: Role::Member,
            email: Some(format!("{name}@example.org")),
            active: true,
            score,
        }
    }

    #[tokio::test]
    async fn enroll_rejects_duplicates_and_credits_score_once() {
        let store = MemoryStore::new();
        let event = store.insert_event(sample_event(5, 3)).await.unwrap();
        store.insert_user(sample_user("anna", 0)).await.unwrap();

        store.enroll(event.event_id, "anna").await.unwrap();
        let second = store.enroll(event.event_id, "anna").await;
        assert!(matches!(second, Err(StoreError::AlreadyEnrolled)));

        let anna = store.get_user("anna").await.unwrap().unwrap();
        assert_eq!(anna.score, 3);
    }

    #[tokio::test]
    async fn enroll_enforces_capacity() {
        let store = MemoryStore::new();
        let event = store.insert_event(sample_event(1, 0)).await.unwrap();
        store.insert_user(sample_user("anna", 0)).await.unwrap();
        store.insert_user(sample_user("ben", 0)).await.unwrap();

        store.enroll(event.event_id, "anna").await.unwrap();
        let full = store.enroll(event.event_id, "ben").await;
        assert!(matches!(full, Err(StoreError::CapacityExceeded)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_enrolls_never_exceed_capacity() {
        let store = Arc::new(MemoryStore::new());
        let event = store.insert_event(sample_event(2, 0)).await.unwrap();
        for i in 0..8 {
            store
                .insert_user(sample_user(&format!("user{i}"), 0))
                .await
                .unwrap();
        }

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            let event_id = event.event_id;
            handles.push(tokio::spawn(async move {
                store.enroll(event_id, &format!("user{i}")).await.is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 2);
        let enrolled = store.enrollments_for_event(event.event_id).await.unwrap();
        assert_eq!(enrolled.len(), 2);
    }

    #[tokio::test]
    async fn deleting_event_cascades_enrollments() {
        let store = MemoryStore::new();
        let event = store.insert_event(sample_event(5, 0)).await.unwrap();
        store.insert_user(sample_user("anna", 0)).await.unwrap();
        store.enroll(event.event_id, "anna").await.unwrap();

        assert!(store.delete_event(event.event_id).await.unwrap());
        let inner = store.inner.lock().await;
        assert!(inner.enrollments.is_empty());
    }

    #[tokio::test]
    async fn update_event_rejects_capacity_below_enrollment_count() {
        let store = MemoryStore::new();
        let event = store.insert_event(sample_event(3, 0)).await.unwrap();
        store.insert_user(sample_user("anna", 0)).await.unwrap();
        store.insert_user(sample_user("ben", 0)).await.unwrap();
        store.enroll(event.event_id, "anna").await.unwrap();
        store.enroll(event.event_id, "ben").await.unwrap();

        let update = EventUpdate {
            title: event.title.clone(),
            event_date: event.event_date,
            starts_at: None,
            ends_at: None,
            description: event.description.clone(),
            capacity: 1,
            deadline: None,
            organizer_name: None,
            organizer_email: None,
            reward_score: 0,
        };
        let result = store.update_event(event.event_id, update).await;
        assert!(matches!(result, Err(StoreError::CapacityExceeded)));
    }

    #[tokio::test]
    async fn withdraw_is_idempotent() {
        let store = MemoryStore::new();
        let event = store.insert_event(sample_event(5, 0)).await.unwrap();
        store.insert_user(sample_user("anna", 0)).await.unwrap();
        store.enroll(event.event_id, "anna").await.unwrap();

        assert!(store.withdraw(event.event_id, "anna").await.unwrap());
        assert!(!store.withdraw(event.event_id, "anna").await.unwrap());
        assert!(!store.withdraw(event.event_id, "never-there").await.unwrap());
    }
}
