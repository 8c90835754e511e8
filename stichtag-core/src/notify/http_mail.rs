//! HTTP mail delivery.
//!
//! POSTs a SendGrid-style JSON payload to the configured endpoint. The mail
//! section of the shared config is read on every send, so a config reload
//! takes effect without restarting; when the section is absent every send
//! reports `NotConfigured`.

use super::{Notification, NotificationSender, NotifyError};
use crate::config::MailConfig;
use async_trait::async_trait;
use fast32::base64::RFC4648;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Serialize)]
struct Recipient<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: Vec<Recipient<'a>>,
}

#[derive(Serialize)]
struct Sender<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct Attachment<'a> {
    content: String,
    #[serde(rename = "type")]
    kind: &'a str,
    filename: &'a str,
    disposition: &'a str,
}

#[derive(Serialize)]
struct MailPayload<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Sender<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachments: Option<Vec<Attachment<'a>>>,
}

impl<'a> MailPayload<'a> {
    fn build(mail: &'a MailConfig, note: &'a Notification) -> Self {
        Self {
            personalizations: vec![Personalization {
                to: vec![Recipient { email: &note.to }],
            }],
            from: Sender {
                email: &mail.sender_address,
                name: &mail.sender_name,
            },
            subject: &note.subject,
            content: vec![Content {
                kind: "text/plain",
                value: &note.body,
            }],
            attachments: note.calendar.as_ref().map(|invite| {
                vec![Attachment {
                    content: RFC4648.encode(invite.as_bytes()),
                    kind: "text/calendar",
                    filename: "invite.ics",
                    disposition: "attachment",
                }]
            }),
        }
    }
}

/// Delivers notifications as mail through an HTTP mail service.
pub struct HttpMailSender {
    http_client: reqwest::Client,
    mail: Arc<RwLock<Option<MailConfig>>>,
}

impl HttpMailSender {
    /// Create a new HttpMailSender reading the given mail config section.
    pub fn new(mail: Arc<RwLock<Option<MailConfig>>>) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            mail,
        }
    }
}

#[async_trait]
impl NotificationSender for HttpMailSender {
    async fn send(&self, note: &Notification) -> Result<(), NotifyError> {
        let Some(mail) = self.mail.read().await.clone() else {
            return Err(NotifyError::NotConfigured);
        };

        let payload = MailPayload::build(&mail, note);
        let response = self
            .http_client
            .post(mail.endpoint.clone())
            .bearer_auth(&mail.api_token)
            .timeout(Duration::from_secs(mail.timeout_secs))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(to = %note.to, subject = %note.subject, "mail accepted");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
