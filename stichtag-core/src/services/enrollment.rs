//! Direct enrollment and withdrawal.
//!
//! The EnrollmentService is responsible for:
//! - Capacity-bounded, duplicate-rejecting enrollment
//! - Crediting the event's reward score, at most once per membership
//! - Sending the best-effort confirmation mail with the iCalendar invite
//! - Idempotent withdrawal (a free seat, never a debited score)
//!
//! The atomic parts (duplicate check, capacity check, insert, credit) live
//! in the store; this service adds policy and notification on top.

use super::{NotificationOutcome, deliver};
use crate::calendar;
use crate::config::{EnrollmentConfig, MissingContactPolicy};
use crate::entities::event_records::EventRecord;
use crate::notify::{Notification, NotificationSender};
use crate::store::{Store, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Errors that can occur during enrollment or withdrawal.
#[derive(Debug, Error)]
pub enum EnrollError {
    /// No event with the given id.
    #[error("event not found")]
    EventNotFound,

    /// No such user, or the user is deactivated.
    #[error("user not found")]
    UserNotFound,

    /// The user already holds a seat. Duplicates are a conflict, not a no-op.
    #[error("already enrolled")]
    AlreadyEnrolled,

    /// Every seat is taken.
    #[error("no free seats")]
    CapacityExceeded,

    /// The user has no email address and policy forbids enrolling without one.
    #[error("no contact address on file")]
    MissingContact,

    /// Underlying storage failure.
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for EnrollError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EventNotFound => Self::EventNotFound,
            StoreError::UserNotFound => Self::UserNotFound,
            StoreError::AlreadyEnrolled => Self::AlreadyEnrolled,
            StoreError::CapacityExceeded => Self::CapacityExceeded,
            other => Self::Store(other),
        }
    }
}

/// Result of a successful enrollment.
#[derive(Debug)]
pub struct EnrollReceipt {
    /// The event the seat was taken on.
    pub event: EventRecord,
    /// Whether the confirmation mail went out.
    pub notification: NotificationOutcome,
}

/// Handles direct (self-service) enrollment and withdrawal.
pub struct EnrollmentService {
    store: Arc<dyn Store>,
    notifier: Arc<dyn NotificationSender>,
    policy: Arc<RwLock<EnrollmentConfig>>,
}

impl EnrollmentService {
    pub fn new(
        store: Arc<dyn Store>,
        notifier: Arc<dyn NotificationSender>,
        policy: Arc<RwLock<EnrollmentConfig>>,
    ) -> Self {
        Self {
            store,
            notifier,
            policy,
        }
    }

    /// Enrolls `username` into the event.
    ///
    /// The seat is durable once the store call returns; the confirmation
    /// mail afterwards is best-effort and its outcome is only reported.
    pub async fn enroll(
        &self,
        event_id: Uuid,
        username: &str,
    ) -> Result<EnrollReceipt, EnrollError> {
        let user = self
            .store
            .get_user(username)
            .await?
            .ok_or(EnrollError::UserNotFound)?;
        // Deactivated users are indistinguishable from unknown ones here.
        if !user.active {
            return Err(EnrollError::UserNotFound);
        }
        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or(EnrollError::EventNotFound)?;

        if user.email.is_none() {
            let policy = self.policy.read().await.missing_contact;
            if policy == MissingContactPolicy::Reject {
                return Err(EnrollError::MissingContact);
            }
        }

        self.store.enroll(event_id, username).await?;
        info!(event_id = %event_id, username = %username, "enrollment recorded");

        let notification = match &user.email {
            Some(address) => {
                deliver(self.notifier.as_ref(), &confirmation_note(&event, address)).await
            }
            None => NotificationOutcome::Skipped,
        };

        Ok(EnrollReceipt {
            event,
            notification,
        })
    }

    /// Withdraws `username` from the event.
    ///
    /// Withdrawing without a membership is a successful no-op; the returned
    /// bool reports whether a seat was actually released. The reward score
    /// is never debited.
    pub async fn withdraw(&self, event_id: Uuid, username: &str) -> Result<bool, EnrollError> {
        let released = self.store.withdraw(event_id, username).await?;
        if released {
            info!(event_id = %event_id, username = %username, "enrollment withdrawn");
        }
        Ok(released)
    }
}

fn confirmation_note(event: &EventRecord, address: &str) -> Notification {
    Notification {
        to: address.to_string(),
        subject: format!("Confirmed: \"{}\"", event.title),
        body: format!(
            "You are signed up for \"{}\" on {}.\nThe calendar invite is attached.",
            event.title, event.event_date
        ),
        calendar: Some(calendar::build_invite(event)),
    }
}
