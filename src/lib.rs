//! procmine - process-mining API, dashboard and container entrypoint.
//!
//! One binary covers both deployed services and the tooling around them:
//!
//! - **Entrypoint** - waits for the database with a bounded, backed-off
//!   poll (with a single fallback probe), applies migrations, then replaces
//!   itself with the server command.
//! - **API** - cycle time, bottlenecks, throughput, conformance, process
//!   maps and two small predictive models over an issue-tracker event log.
//! - **Dashboard** - filtered views and CSV exports that reach the data
//!   only through the API.
//!
//! # Modules
//!
//! - [`domain`] - Event logs and the process-mining computations (no I/O)
//! - [`port`] - Traits at the seams: probe, migrator, launcher, event store
//! - [`adapter`] - CLI, HTTP and dashboard inbound; SQLite, TCP, process,
//!   Graphviz and model-file outbound
//! - [`application`] - Use cases shared by the API and the CLI
//! - [`api`] - Wire types and the retrying API client
//! - [`infrastructure`] - Configuration, backoff, readiness, entrypoint
//! - [`error`] - Error types and exit codes

pub mod adapter;
pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
