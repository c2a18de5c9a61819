//! Storage-agnostic process-mining logic.
//!
//! Everything here works on in-memory [`EventLog`]s: metrics, process maps,
//! conformance and the predictive models. Nothing in this module performs
//! I/O.

pub mod conformance;
pub mod csv;
pub mod database;
pub mod event;
pub mod features;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod process_map;
pub mod synthetic;

pub use database::{DatabaseTarget, EmbeddedDatabase, Endpoint};
pub use event::{CaseRecord, Event, EventLog, Trace, REOPEN_ACTIVITY};
pub use features::CaseFeatures;
pub use model::{DurationModel, ReopenRiskModel, RiskScore};
pub use process_map::{MapFormat, Miner, ProcessMap};
