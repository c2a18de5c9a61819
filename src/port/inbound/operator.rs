//! Operator capability surface for CLI handlers.
//!
//! The CLI parses arguments and renders results; everything that needs
//! configuration, storage or the network happens behind [`OperatorPort`].

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::metrics::{Bottleneck, CycleTimeSummary};
use crate::domain::model::Evaluation;
use crate::domain::Endpoint;
use crate::error::Result;
use crate::port::outbound::store::IngestSummary;

/// What the `entrypoint` command was asked to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrypointRequest {
    /// Overrides `MIGRATE_COMMAND` when set.
    pub migrate_command: Option<String>,
    /// Server argv to hand the process over to.
    pub command: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Redacted `DATABASE_URL`.
    pub database: String,
    /// Endpoint that passed the readiness wait; `None` for sqlite.
    pub endpoint: Option<Endpoint>,
    pub applied: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingOutcome {
    pub models_dir: PathBuf,
    pub cases: usize,
    pub duration: Option<Evaluation>,
    pub reopen_risk: Option<Evaluation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub metrics: CycleTimeSummary,
    pub bottleneck: Vec<Bottleneck>,
}

/// Answer of one `/health` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceHealth {
    pub url: String,
    pub status: u16,
    pub healthy: bool,
}

#[async_trait]
pub trait OperatorPort: Send + Sync {
    /// Wait for the database, migrate, then replace the process with the
    /// requested command. Returns only on failure where `exec` exists.
    async fn entrypoint(&self, request: EntrypointRequest) -> Result<()>;

    /// The entrypoint's setup without the hand-off.
    async fn migrate(&self, migrate_command: Option<String>) -> Result<MigrationOutcome>;

    /// Run the REST API until shutdown.
    async fn serve_api(&self) -> Result<()>;

    /// Run the dashboard until shutdown.
    async fn serve_dashboard(&self) -> Result<()>;

    /// Import a CSV event log into the configured database.
    async fn load_events(&self, csv: String) -> Result<IngestSummary>;

    /// Train and persist both models from the database.
    async fn train(&self) -> Result<TrainingOutcome>;

    /// Current cycle-time summary and bottlenecks.
    async fn report(&self) -> Result<MetricsReport>;

    /// `GET <base_url>/health` once, without retries.
    async fn check(&self, base_url: String) -> Result<ServiceHealth>;
}
