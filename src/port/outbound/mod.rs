//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the infrastructure the entrypoint and the API
//! depend on: database reachability, schema migration, process hand-off
//! and event storage.

pub mod launcher;
pub mod migrator;
pub mod probe;
pub mod store;
