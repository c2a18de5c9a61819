//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`probe`]: scripted [`ConnectivityProbe`](crate::port::ConnectivityProbe)
//!   that records every probe.
//! - [`doubles`]: recording migrator and launcher.
//! - [`domain`]: builders for events and a small but varied sample log.
//! - [`config`]: canonical test configurations (zero-delay readiness, etc.).
//! - [`store`]: migrated in-memory event stores.

pub mod config;
pub mod domain;
pub mod doubles;
pub mod probe;
pub mod store;
