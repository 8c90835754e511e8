//! Domain services.
//!
//! - `EnrollmentService` — direct enrollment and withdrawal
//! - `AllocationEngine` — the post-deadline seat draw
//! - `DeadlineSweeper` — finds due events and runs the draw for each

mod allocation;
mod enrollment;
mod sweeper;

pub use allocation::{AllocationEngine, AllocationOutcome};
pub use enrollment::{EnrollError, EnrollReceipt, EnrollmentService};
pub use sweeper::{DeadlineSweeper, SweepReport};

use crate::notify::{Notification, NotificationSender, NotifyError};
use stichtag_sdk::objects::enroll::NotificationStatus;
use tracing::warn;

/// What happened to the best-effort notification attached to a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// The mail service accepted the message.
    Sent,
    /// Delivery failed; the state change stands regardless.
    Failed,
    /// Nothing to send: no recipient address or no mail configuration.
    Skipped,
}

impl From<NotificationOutcome> for NotificationStatus {
    fn from(outcome: NotificationOutcome) -> Self {
        match outcome {
            NotificationOutcome::Sent => NotificationStatus::Sent,
            NotificationOutcome::Failed => NotificationStatus::Failed,
            NotificationOutcome::Skipped => NotificationStatus::Skipped,
        }
    }
}

/// Delivers one notification and folds the result into an outcome.
///
/// Failures are logged here; callers only branch on the outcome.
pub(crate) async fn deliver(
    notifier: &dyn NotificationSender,
    note: &Notification,
) -> NotificationOutcome {
    match notifier.send(note).await {
        Ok(()) => NotificationOutcome::Sent,
        Err(NotifyError::NotConfigured) => NotificationOutcome::Skipped,
        Err(e) => {
            warn!(to = %note.to, subject = %note.subject, error = %e, "notification failed");
            NotificationOutcome::Failed
        }
    }
}
