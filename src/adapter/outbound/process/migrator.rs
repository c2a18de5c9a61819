//! Migrations delegated to an operator-supplied shell command.

use std::process::Command;

use tracing::info;

use crate::domain::Endpoint;
use crate::error::{ConfigError, MigrationError};
use crate::port::Migrator;

/// Runs `MIGRATE_COMMAND` through the platform shell.
///
/// The command inherits the environment (so `POSTGRES_*` and
/// `DATABASE_URL` reach it) and stdio. When readiness settled on an
/// endpoint, `DB_HOST`/`DB_PORT` are overridden to point at it.
#[derive(Debug, Clone)]
pub struct CommandMigrator {
    command: String,
}

impl CommandMigrator {
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] for a blank command.
    pub fn new(command: impl Into<String>) -> Result<Self, ConfigError> {
        let command = command.into();
        if command.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "MIGRATE_COMMAND",
                reason: "must not be blank".to_string(),
            });
        }
        Ok(Self { command })
    }

    fn shell(&self) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(&self.command);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&self.command);
            cmd
        }
    }
}

impl Migrator for CommandMigrator {
    fn describe(&self) -> String {
        format!("migration command `{}`", self.command)
    }

    fn migrate(&self, endpoint: Option<&Endpoint>) -> Result<Vec<String>, MigrationError> {
        let mut cmd = self.shell();
        if let Some(endpoint) = endpoint {
            cmd.env("DB_HOST", &endpoint.host)
                .env("DB_PORT", endpoint.port.to_string());
        }

        info!(command = %self.command, "Running migration command");
        let status = cmd.status().map_err(MigrationError::Spawn)?;
        if !status.success() {
            return Err(MigrationError::Rejected { status });
        }
        Ok(Vec::new())
    }
}
