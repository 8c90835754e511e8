//! Re-exports of the validated runtime configuration types.
//!
//! The server deals with two configuration representations: the serde
//! structures in [`super::file`] that mirror the TOML file, and the
//! validated runtime types defined in `stichtag-core` that the rest of
//! the system consumes. This module pulls the latter into the server's
//! config namespace.

pub use stichtag_core::config::{
    AuthConfig, EnrollmentConfig, MailConfig, MissingContactPolicy, ServerConfig, SharedConfig,
    SweepConfig,
};
