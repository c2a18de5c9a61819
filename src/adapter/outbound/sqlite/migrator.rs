//! Embedded diesel migrations for the SQLite database.

use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
use crate::domain::{EmbeddedDatabase, Endpoint};
use crate::error::MigrationError;
use crate::port::Migrator;

/// Applies the migration set compiled into the binary.
pub struct EmbeddedMigrator {
    database: EmbeddedDatabase,
}

impl EmbeddedMigrator {
    #[must_use]
    pub fn new(database: EmbeddedDatabase) -> Self {
        Self { database }
    }
}

impl Migrator for EmbeddedMigrator {
    fn describe(&self) -> String {
        format!("embedded migrations on {}", self.database.connection_string())
    }

    fn migrate(&self, _endpoint: Option<&Endpoint>) -> Result<Vec<String>, MigrationError> {
        let pool = create_pool(&self.database)
            .map_err(|e| MigrationError::Connection(e.to_string()))?;
        run_migrations(&pool)
    }
}
