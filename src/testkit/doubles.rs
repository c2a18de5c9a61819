//! Recording doubles for the migration and launch ports.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::domain::Endpoint;
use crate::error::{LaunchError, MigrationError};
use crate::port::{Launcher, Migrator, StartupCommand};

/// Migrator that counts runs and optionally fails.
#[derive(Debug, Default)]
pub struct RecordingMigrator {
    runs: AtomicUsize,
    endpoints: Mutex<Vec<Option<Endpoint>>>,
    fail_with: Option<String>,
}

impl RecordingMigrator {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// Endpoint passed to each run.
    pub fn endpoints(&self) -> Vec<Option<Endpoint>> {
        self.endpoints.lock().clone()
    }
}

impl Migrator for RecordingMigrator {
    fn describe(&self) -> String {
        "recording migrator".to_string()
    }

    fn migrate(&self, endpoint: Option<&Endpoint>) -> Result<Vec<String>, MigrationError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        self.endpoints.lock().push(endpoint.cloned());
        match &self.fail_with {
            Some(reason) => Err(MigrationError::Embedded(reason.clone())),
            None => Ok(vec!["20250601000000".to_string()]),
        }
    }
}

/// Launcher that records commands instead of running them.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    launched: Mutex<Vec<StartupCommand>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn launched(&self) -> Vec<StartupCommand> {
        self.launched.lock().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, command: &StartupCommand) -> Result<(), LaunchError> {
        self.launched.lock().push(command.clone());
        Ok(())
    }
}
