//! Shared types for the Stichtag API.
//!
//! This crate carries everything the server and its clients agree on:
//! request/response objects, the signed access-token scheme, and (behind
//! the `client` feature) typed HTTP clients.

pub mod objects;
pub mod token;

#[cfg(feature = "client")]
pub mod client;
