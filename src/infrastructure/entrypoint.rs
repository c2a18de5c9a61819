//! Container entrypoint: wait for the database, migrate, then hand off.
//!
//! Setup runs to completion before the server command is launched. Each
//! failure kind surfaces as its own error (and exit code), and the server
//! is never started after a failed step.

use std::sync::Arc;

use tracing::info;

use super::config::Settings;
use super::readiness::{Readiness, ReadinessPoller};
use crate::domain::DatabaseTarget;
use crate::error::{MigrationError, Result};
use crate::port::{ConnectivityProbe, Launcher, Migrator, StartupCommand};

/// What setup established before the hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    /// `None` when the wait was skipped for an embedded database.
    pub readiness: Option<Readiness>,
    pub applied_migrations: Vec<String>,
}

/// Wiring of the entrypoint procedure.
pub struct Entrypoint<'a> {
    settings: &'a Settings,
    probe: &'a dyn ConnectivityProbe,
    migrator: Arc<dyn Migrator>,
    launcher: &'a dyn Launcher,
}

impl<'a> Entrypoint<'a> {
    pub fn new(
        settings: &'a Settings,
        probe: &'a dyn ConnectivityProbe,
        migrator: Arc<dyn Migrator>,
        launcher: &'a dyn Launcher,
    ) -> Self {
        Self {
            settings,
            probe,
            migrator,
            launcher,
        }
    }

    /// Wait for the database (networked targets only), then migrate.
    ///
    /// # Errors
    ///
    /// Readiness errors when the database never answers, migration errors
    /// when the schema cannot be brought up to date.
    pub async fn setup(&self, target: &DatabaseTarget) -> Result<SetupReport> {
        let readiness = match target {
            DatabaseTarget::Embedded(db) => {
                info!(
                    database = %db.connection_string(),
                    "Embedded database, skipping readiness wait"
                );
                None
            }
            DatabaseTarget::Networked { .. } => {
                info!(
                    database = %target,
                    scheme = target.scheme(),
                    user = self.settings.credentials.user.as_deref().unwrap_or(""),
                    name = self.settings.credentials.name.as_deref().unwrap_or(""),
                    "Networked database, waiting for readiness"
                );
                let poller = ReadinessPoller::new(self.probe, &self.settings.readiness);
                let ready = poller
                    .wait(
                        &self.settings.primary_endpoint(),
                        &self.settings.fallback_endpoint(),
                    )
                    .await?;
                Some(ready)
            }
        };

        info!(migrator = %self.migrator.describe(), "Applying migrations");
        let migrator = Arc::clone(&self.migrator);
        let endpoint = readiness.as_ref().map(|r| r.endpoint.clone());
        let applied = tokio::task::spawn_blocking(move || migrator.migrate(endpoint.as_ref()))
            .await
            .map_err(|e| MigrationError::Aborted(e.to_string()))??;
        info!(applied = applied.len(), "Migrations complete");

        Ok(SetupReport {
            readiness,
            applied_migrations: applied,
        })
    }

    /// Run setup, then replace this process with `command`.
    ///
    /// # Errors
    ///
    /// Any setup error, or a launch error when the hand-off fails.
    pub async fn run(&self, target: &DatabaseTarget, command: StartupCommand) -> Result<SetupReport> {
        let report = self.setup(target).await?;

        let command = match &report.readiness {
            Some(ready) if ready.via_fallback => command.with_endpoint(&ready.endpoint),
            _ => command,
        };
        info!(command = %command, "Starting server");
        self.launcher.launch(&command)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Endpoint;
    use crate::testkit::config;
    use crate::testkit::doubles::{RecordingLauncher, RecordingMigrator};
    use crate::testkit::probe::ScriptedProbe;
    use crate::error::Error;

    fn command() -> StartupCommand {
        StartupCommand::from_argv(vec!["procmine".into(), "serve".into()]).unwrap()
    }

    #[tokio::test]
    async fn embedded_target_never_probes() {
        let settings = config::settings(&[("DATABASE_URL", "sqlite:///app/db.sqlite3")]);
        let probe = ScriptedProbe::new();
        let migrator = Arc::new(RecordingMigrator::succeeding());
        let launcher = RecordingLauncher::new();
        let target = settings.database_target().unwrap();

        let report = Entrypoint::new(&settings, &probe, migrator.clone(), &launcher)
            .run(&target, command())
            .await
            .unwrap();

        assert!(probe.calls().is_empty());
        assert!(report.readiness.is_none());
        assert_eq!(migrator.runs(), 1);
        assert_eq!(launcher.launched(), vec![command()]);
    }

    #[tokio::test]
    async fn networked_target_waits_before_migrating() {
        let settings = config::settings(&[("DATABASE_URL", "postgres://u:p@db/app")]);
        let primary = Endpoint::new("db", 5432);
        let probe = ScriptedProbe::new().answer(&primary, [false, true]);
        let migrator = Arc::new(RecordingMigrator::succeeding());
        let launcher = RecordingLauncher::new();
        let target = settings.database_target().unwrap();

        let report = Entrypoint::new(&settings, &probe, migrator.clone(), &launcher)
            .run(&target, command())
            .await
            .unwrap();

        assert_eq!(probe.calls_to(&primary), 2);
        assert_eq!(report.readiness.unwrap().attempts, 2);
        assert_eq!(migrator.endpoints(), vec![Some(primary)]);
        assert_eq!(launcher.launched()[0].env, Vec::new());
    }

    #[tokio::test]
    async fn migration_failure_blocks_launch() {
        let settings = config::settings(&[("DATABASE_URL", "sqlite://db.sqlite3")]);
        let probe = ScriptedProbe::new();
        let migrator = Arc::new(RecordingMigrator::failing("duplicate column"));
        let launcher = RecordingLauncher::new();
        let target = settings.database_target().unwrap();

        let err = Entrypoint::new(&settings, &probe, migrator, &launcher)
            .run(&target, command())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Migration(_)));
        assert_eq!(err.exit_code(), 4);
        assert!(launcher.launched().is_empty());
    }

    #[tokio::test]
    async fn unreachable_database_blocks_migration_and_launch() {
        let settings = config::settings(&[("DATABASE_URL", "mysql://db/app")]);
        let probe = ScriptedProbe::new();
        let migrator = Arc::new(RecordingMigrator::succeeding());
        let launcher = RecordingLauncher::new();
        let target = settings.database_target().unwrap();

        let err = Entrypoint::new(&settings, &probe, migrator.clone(), &launcher)
            .run(&target, command())
            .await
            .unwrap_err();

        assert_eq!(err.exit_code(), 3);
        assert_eq!(probe.calls().len(), 3 + 1);
        assert_eq!(migrator.runs(), 0);
        assert!(launcher.launched().is_empty());
    }

    #[tokio::test]
    async fn fallback_endpoint_is_exported_to_the_server() {
        let settings = config::settings(&[("DATABASE_URL", "postgres://db/app")]);
        let fallback = Endpoint::new("127.0.0.1", 5432);
        let probe = ScriptedProbe::new().answer(&fallback, [true]);
        let migrator = Arc::new(RecordingMigrator::succeeding());
        let launcher = RecordingLauncher::new();
        let target = settings.database_target().unwrap();

        Entrypoint::new(&settings, &probe, migrator.clone(), &launcher)
            .run(&target, command())
            .await
            .unwrap();

        assert_eq!(migrator.endpoints(), vec![Some(fallback)]);
        let launched = &launcher.launched()[0];
        assert!(launched
            .env
            .contains(&("DB_HOST".to_string(), "127.0.0.1".to_string())));
    }
}
