#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod calendar;
pub mod config;
pub mod entities;
pub mod notify;
pub mod services;
pub mod store;
