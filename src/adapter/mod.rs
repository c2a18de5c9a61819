//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - Driving side: CLI, REST API, dashboard
//! - [`outbound`] - Driven side: SQLite, TCP probe, child processes,
//!   Graphviz, model files

pub mod inbound;
pub mod outbound;
