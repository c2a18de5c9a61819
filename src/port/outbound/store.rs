//! Event storage port.

use std::future::Future;

use serde::Serialize;

use crate::domain::{CaseRecord, Event, EventLog};
use crate::error::Result;

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub events: usize,
    pub cases_created: usize,
    pub cases_updated: usize,
}

/// Persistence for cases and their events.
pub trait EventStore: Send + Sync {
    /// Check that the store answers queries.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    /// Load every event, grouped into traces.
    fn load_log(&self) -> impl Future<Output = Result<EventLog>> + Send;

    /// A case and its chronologically ordered events.
    fn case(
        &self,
        case_id: &str,
    ) -> impl Future<Output = Result<Option<(CaseRecord, Vec<Event>)>>> + Send;

    /// Insert events in one transaction, creating cases on first sight and
    /// refreshing the derived case fields of every touched case.
    fn ingest(&self, events: Vec<Event>) -> impl Future<Output = Result<IngestSummary>> + Send;
}
