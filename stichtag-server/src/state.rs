//! Application state shared across all request handlers.

use std::sync::Arc;

use stichtag_core::config::SharedConfig;
use stichtag_core::services::{DeadlineSweeper, EnrollmentService};
use stichtag_core::store::Store;

/// Application state that is shared across all request handlers.
///
/// Cloning is cheap: every field is an `Arc` (or a bundle of them).
#[derive(Clone)]
pub struct AppState {
    /// Storage backend (Postgres in production, in-memory for development).
    pub store: Arc<dyn Store>,
    /// Runtime configuration, reloadable via SIGHUP.
    pub config: SharedConfig,
    /// Direct enrollment and withdrawal.
    pub enrollment: Arc<EnrollmentService>,
    /// Deadline sweeper; the manual trigger shares its pass lock with
    /// the background loop.
    pub sweeper: Arc<DeadlineSweeper>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        config: SharedConfig,
        enrollment: Arc<EnrollmentService>,
        sweeper: Arc<DeadlineSweeper>,
    ) -> Self {
        Self {
            store,
            config,
            enrollment,
            sweeper,
        }
    }
}
