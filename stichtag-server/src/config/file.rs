//! TOML file configuration structures.
//!
//! These structs map directly onto the `stichtag-config.toml` file format.
//! Sections other than `[auth]` are optional and fall back to defaults;
//! `[mail]` and `[bootstrap]` are optional with no default.
//!
//! Everything here is `Serialize` as well, because the loader rewrites the
//! file once to replace a plaintext bootstrap password with its hash.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    pub auth: AuthSection,
    #[serde(default)]
    pub enrollment: EnrollmentSection,
    #[serde(default)]
    pub sweep: SweepSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<MailSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap: Option<BootstrapSection>,
}

impl FileConfig {
    /// Check whether the bootstrap password is already in hashed form.
    ///
    /// A config without a bootstrap section counts as hashed, so the
    /// loader never rewrites the file for it.
    pub fn is_bootstrap_password_hashed(&self) -> bool {
        self.bootstrap
            .as_ref()
            .is_none_or(|bootstrap| bootstrap.password.starts_with("$argon2"))
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("valid default address")
}

/// `[auth]` section. The secret signs access tokens and is the only
/// configuration value without a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSection {
    pub secret: String,
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
}

fn default_token_ttl_minutes() -> i64 {
    120
}

/// `[enrollment]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrollmentSection {
    #[serde(default)]
    pub missing_contact: MissingContactSetting,
}

/// What to do when a user without an email address enrolls directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingContactSetting {
    /// Refuse the enrollment.
    #[default]
    Reject,
    /// Take the seat, skip the confirmation mail.
    SkipNotification,
}

/// `[sweep]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSection {
    /// Seconds between deadline sweep passes. `0` disables the loop.
    #[serde(default = "default_sweep_interval_secs")]
    pub interval_secs: u64,
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

/// `[mail]` section. Absent means notifications are skipped entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailSection {
    /// Mail service endpoint, e.g. `https://api.sendgrid.com/v3/mail/send`.
    pub endpoint: Url,
    pub api_token: String,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    pub sender_address: String,
    #[serde(default = "default_mail_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_sender_name() -> String {
    "Stichtag".to_string()
}

fn default_mail_timeout_secs() -> u64 {
    10
}

/// `[bootstrap]` section: an admin account created on startup if missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapSection {
    pub username: String,
    /// Plaintext on first boot; replaced with its argon2 hash in place.
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
            [server]
            listen = "127.0.0.1:3000"

            [auth]
            secret = "a-long-enough-signing-secret"
            token_ttl_minutes = 30

            [enrollment]
            missing_contact = "skip-notification"

            [sweep]
            interval_secs = 600

            [mail]
            endpoint = "https://api.sendgrid.com/v3/mail/send"
            api_token = "SG.test"
            sender_name = "Club"
            sender_address = "club@example.org"
            timeout_secs = 5

            [bootstrap]
            username = "admin"
            password = "change-me"
        "#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.auth.token_ttl_minutes, 30);
        assert_eq!(
            config.enrollment.missing_contact,
            MissingContactSetting::SkipNotification
        );
        assert_eq!(config.sweep.interval_secs, 600);
        assert_eq!(config.mail.as_ref().unwrap().sender_address, "club@example.org");
        assert!(!config.is_bootstrap_password_hashed());
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let toml_str = r#"
            [auth]
            secret = "a-long-enough-signing-secret"
        "#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.auth.token_ttl_minutes, 120);
        assert_eq!(
            config.enrollment.missing_contact,
            MissingContactSetting::Reject
        );
        assert_eq!(config.sweep.interval_secs, 3600);
        assert!(config.mail.is_none());
        assert!(config.bootstrap.is_none());
        assert!(config.is_bootstrap_password_hashed());
    }

    #[test]
    fn hashed_bootstrap_password_is_detected() {
        let toml_str = r#"
            [auth]
            secret = "a-long-enough-signing-secret"

            [bootstrap]
            username = "admin"
            password = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$AAAA"
        "#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.is_bootstrap_password_hashed());
    }
}
