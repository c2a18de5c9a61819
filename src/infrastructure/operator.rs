//! Settings-backed implementation of the CLI operator port.

use async_trait::async_trait;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::{ClientConfig, Settings};
use super::entrypoint::Entrypoint;
use super::factory;
use crate::adapter::inbound::{dashboard, http};
use crate::adapter::outbound::graphviz::GraphvizRenderer;
use crate::adapter::outbound::model_store::ModelStore;
use crate::adapter::outbound::process::ExecLauncher;
use crate::adapter::outbound::sqlite::SqliteEventStore;
use crate::adapter::outbound::tcp::TcpProbe;
use crate::api::ApiClient;
use crate::application::MiningService;
use crate::domain::ingest::parse_events;
use crate::error::Result;
use crate::port::inbound::operator::{
    EntrypointRequest, MetricsReport, MigrationOutcome, OperatorPort, ServiceHealth,
    TrainingOutcome,
};
use crate::port::{EventStore, IngestSummary, StartupCommand};

/// Operator over the settings loaded at startup.
pub struct Operator {
    settings: Settings,
}

impl Operator {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    fn mining_service(&self) -> Result<MiningService<SqliteEventStore>> {
        let store = factory::open_store(&self.settings)?;
        Ok(MiningService::new(
            store,
            ModelStore::new(&self.settings.server.models_dir),
            GraphvizRenderer::new(self.settings.server.graphviz_dot.clone()),
        ))
    }
}

#[async_trait]
impl OperatorPort for Operator {
    async fn entrypoint(&self, request: EntrypointRequest) -> Result<()> {
        // configuration problems surface before any waiting starts
        let command = StartupCommand::from_argv(request.command)?;
        let target = self.settings.database_target()?;
        let migrator =
            factory::migrator_for(&self.settings, &target, request.migrate_command.as_deref())?;

        Entrypoint::new(&self.settings, &TcpProbe, migrator, &ExecLauncher)
            .run(&target, command)
            .await?;
        Ok(())
    }

    async fn migrate(&self, migrate_command: Option<String>) -> Result<MigrationOutcome> {
        let target = self.settings.database_target()?;
        let migrator = factory::migrator_for(&self.settings, &target, migrate_command.as_deref())?;
        let report = Entrypoint::new(&self.settings, &TcpProbe, migrator, &ExecLauncher)
            .setup(&target)
            .await?;
        Ok(MigrationOutcome {
            database: target.to_string(),
            endpoint: report.readiness.map(|r| r.endpoint),
            applied: report.applied_migrations,
        })
    }

    async fn serve_api(&self) -> Result<()> {
        if self.settings.require_secret()?.is_none() {
            warn!("SECRET_KEY is unset; running in debug mode");
        }
        let addr = self.settings.api_bind()?;
        let service = self.mining_service()?;

        info!(debug = self.settings.debug, "Starting API server");
        let listener = TcpListener::bind(addr).await?;
        let app = http::router(http::AppState::new(service, self.settings.debug));
        http::serve(listener, app).await
    }

    async fn serve_dashboard(&self) -> Result<()> {
        let addr = self.settings.dashboard_bind()?;
        let client = ApiClient::new(self.settings.api_url.clone(), self.settings.client.clone())?;

        info!(api_url = %client.base_url(), "Starting dashboard");
        let listener = TcpListener::bind(addr).await?;
        http::serve(listener, dashboard::router(client)).await
    }

    async fn load_events(&self, csv: String) -> Result<IngestSummary> {
        let events = parse_events(&csv)?;
        let store = factory::open_store(&self.settings)?;
        store.ingest(events).await
    }

    async fn train(&self) -> Result<TrainingOutcome> {
        let report = self.mining_service()?.retrain().await?;
        Ok(TrainingOutcome {
            models_dir: self.settings.server.models_dir.clone(),
            cases: report.cases,
            duration: report.duration,
            reopen_risk: report.reopen_risk,
        })
    }

    async fn report(&self) -> Result<MetricsReport> {
        let metrics = self.mining_service()?.metrics().await?;
        Ok(MetricsReport {
            metrics: metrics.metrics,
            bottleneck: metrics.bottleneck,
        })
    }

    async fn check(&self, base_url: String) -> Result<ServiceHealth> {
        let config = ClientConfig {
            max_retries: 0,
            ..self.settings.client.clone()
        };
        let client = ApiClient::new(base_url, config)?;
        let raw = client.get_raw("/health", &[]).await?;
        Ok(ServiceHealth {
            url: client.base_url().to_string(),
            status: raw.status.as_u16(),
            healthy: raw.status.is_success(),
        })
    }
}
