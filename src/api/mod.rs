//! Wire contract of the REST API.
//!
//! The server serializes these types and the dashboard's [`ApiClient`]
//! deserializes them, so both sides stay in step.

pub mod client;
pub mod types;

pub use client::ApiClient;
