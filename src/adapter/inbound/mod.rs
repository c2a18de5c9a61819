//! Inbound adapters (driving side).

pub mod cli;
pub mod dashboard;
pub mod http;
