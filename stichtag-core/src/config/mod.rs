//! Configuration types for Stichtag.
//!
//! These types represent the validated runtime configuration used by the
//! server and can be shared across crates. The actual config loading/parsing
//! is handled by the server crate.

mod auth;
mod enrollment;
mod mail;
mod server;
mod sweep;

pub use auth::AuthConfig;
pub use enrollment::{EnrollmentConfig, MissingContactPolicy};
pub use mail::MailConfig;
pub use server::ServerConfig;
pub use sweep::SweepConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared configuration state with separate locks for each section.
///
/// This allows independent access to different configuration sections
/// without blocking other readers/writers. The mail section is optional;
/// `None` disables outbound notifications entirely.
#[derive(Clone)]
pub struct SharedConfig {
    /// Server configuration (listen address).
    pub server: Arc<RwLock<ServerConfig>>,
    /// Access token configuration (signing secret, TTL).
    pub auth: Arc<RwLock<AuthConfig>>,
    /// Enrollment policy configuration.
    pub enrollment: Arc<RwLock<EnrollmentConfig>>,
    /// Background sweep configuration.
    pub sweep: Arc<RwLock<SweepConfig>>,
    /// Outbound mail configuration, if any.
    pub mail: Arc<RwLock<Option<MailConfig>>>,
}
