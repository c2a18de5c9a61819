//! Composition helpers turning [`Settings`] into concrete adapters.

use std::sync::Arc;

use tracing::info;

use super::config::Settings;
use crate::adapter::outbound::process::CommandMigrator;
use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
use crate::adapter::outbound::sqlite::{EmbeddedMigrator, SqliteEventStore};
use crate::domain::DatabaseTarget;
use crate::error::{ConfigError, Result};
use crate::port::Migrator;

/// Pick the migrator for `target`.
///
/// `command_override` (from the command line) wins over `MIGRATE_COMMAND`.
///
/// # Errors
///
/// [`ConfigError::NoMigratorForNetworked`] when a networked target has no
/// migration command.
pub fn migrator_for(
    settings: &Settings,
    target: &DatabaseTarget,
    command_override: Option<&str>,
) -> std::result::Result<Arc<dyn Migrator>, ConfigError> {
    match target {
        DatabaseTarget::Embedded(db) => Ok(Arc::new(EmbeddedMigrator::new(db.clone()))),
        DatabaseTarget::Networked { .. } => {
            let command = command_override
                .map(str::to_string)
                .or_else(|| settings.migrate_command.clone())
                .ok_or_else(|| ConfigError::NoMigratorForNetworked {
                    url: target.to_string(),
                })?;
            Ok(Arc::new(CommandMigrator::new(command)?))
        }
    }
}

/// Open the SQLite event store named by `DATABASE_URL`, bringing its schema
/// up to date.
///
/// # Errors
///
/// A configuration error for a missing or networked URL, or the pool and
/// migration errors.
pub fn open_store(settings: &Settings) -> Result<SqliteEventStore> {
    let db = match settings.database_target()? {
        DatabaseTarget::Embedded(db) => db,
        networked @ DatabaseTarget::Networked { .. } => {
            return Err(ConfigError::InvalidValue {
                field: "DATABASE_URL",
                reason: format!(
                    "{} databases are not supported by the event store; use sqlite",
                    networked.scheme()
                ),
            }
            .into())
        }
    };

    let pool = create_pool(&db)?;
    let applied = run_migrations(&pool)?;
    if !applied.is_empty() {
        info!(applied = applied.len(), "Applied pending migrations");
    }
    Ok(SqliteEventStore::new(pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::config;

    #[test]
    fn networked_target_requires_a_migrate_command() {
        let settings = config::settings(&[("DATABASE_URL", "postgres://db/app")]);
        let target = settings.database_target().unwrap();
        assert!(matches!(
            migrator_for(&settings, &target, None),
            Err(ConfigError::NoMigratorForNetworked { .. })
        ));

        let migrator = migrator_for(&settings, &target, Some("true")).unwrap();
        assert!(migrator.describe().contains("`true`"));
    }

    #[test]
    fn migrate_command_comes_from_the_environment() {
        let settings = config::settings(&[
            ("DATABASE_URL", "postgres://db/app"),
            ("MIGRATE_COMMAND", "./migrate.sh"),
        ]);
        let target = settings.database_target().unwrap();
        let migrator = migrator_for(&settings, &target, None).unwrap();
        assert!(migrator.describe().contains("./migrate.sh"));
    }

    #[test]
    fn store_rejects_networked_urls() {
        let settings = config::settings(&[("DATABASE_URL", "postgres://db/app")]);
        let err = open_store(&settings).err().unwrap();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn in_memory_store_is_migrated() {
        let settings = config::settings(&[("DATABASE_URL", "sqlite::memory:")]);
        assert!(open_store(&settings).is_ok());
    }
}
