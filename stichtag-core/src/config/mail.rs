//! Outbound mail configuration.

use url::Url;

/// Outbound mail configuration.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Mail service endpoint the JSON payload is POSTed to.
    pub endpoint: Url,
    /// Bearer token for the mail service.
    pub api_token: String,
    /// Display name used as the sender.
    pub sender_name: String,
    /// Address used as the sender.
    pub sender_address: String,
    /// Per-request timeout in seconds; a stuck send counts as failed.
    pub timeout_secs: u64,
}
