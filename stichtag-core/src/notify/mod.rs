//! Outbound notification delivery.
//!
//! Delivery is strictly best-effort and per-recipient: a failed send is
//! reported to the caller and never retried, and it never rolls back the
//! enrollment state that triggered it.

mod http_mail;

pub use http_mail::HttpMailSender;

use async_trait::async_trait;
use thiserror::Error;

/// A single outbound message to a single recipient.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Optional iCalendar invite, attached to the mail when present.
    pub calendar: Option<String>,
}

/// Errors that can occur during notification delivery.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// No mail endpoint is configured. Callers record this as a skipped
    /// notification rather than a failed one.
    #[error("mail delivery is not configured")]
    NotConfigured,

    /// HTTP request error (includes timeouts).
    #[error("mail request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The mail service answered with a non-success status.
    #[error("mail service rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Capability to deliver one message to one recipient.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, note: &Notification) -> Result<(), NotifyError>;
}
