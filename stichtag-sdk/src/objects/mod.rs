//! API request and response types.

pub mod auth;
pub mod enroll;
pub mod events;
pub mod sweep;
pub mod users;
