//! Database connection management using Diesel ORM.
//!
//! Provides connection pooling, migration support, and connection
//! configuration for SQLite databases.

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::domain::EmbeddedDatabase;
use crate::error::{MigrationError, StoreError};

/// Embedded database migrations compiled from the migrations/ directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Pragmas applied to every pooled connection.
#[derive(Debug, Clone, Copy)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Create a connection pool for an embedded database.
///
/// The parent directory of a database file is created if missing. An
/// in-memory database lives only as long as its connection, so it gets a
/// single-connection pool.
///
/// # Errors
/// Returns an error if the pool cannot be created.
pub fn create_pool(database: &EmbeddedDatabase) -> Result<DbPool, StoreError> {
    let max_size = match database {
        EmbeddedDatabase::Memory => 1,
        EmbeddedDatabase::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Connection(format!("{}: {e}", parent.display())))?;
            }
            5
        }
    };
    let manager = ConnectionManager::<SqliteConnection>::new(database.connection_string());
    let mut builder = Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionOptions));
    if matches!(database, EmbeddedDatabase::Memory) {
        // recycling the only connection would discard the database
        builder = builder.idle_timeout(None).max_lifetime(None);
    }
    builder
        .build(manager)
        .map_err(|e| StoreError::Connection(e.to_string()))
}

/// Run all pending database migrations, returning the versions applied.
///
/// # Errors
/// Returns an error if migrations fail.
pub fn run_migrations(pool: &DbPool) -> Result<Vec<String>, MigrationError> {
    let mut conn = pool
        .get()
        .map_err(|e| MigrationError::Connection(e.to_string()))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| MigrationError::Embedded(e.to_string()))?;
    Ok(applied.iter().map(ToString::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::prelude::*;

    #[derive(diesel::QueryableByName)]
    struct TableName {
        #[diesel(sql_type = diesel::sql_types::Text)]
        name: String,
    }

    #[derive(diesel::QueryableByName)]
    struct Flag {
        #[diesel(sql_type = diesel::sql_types::Integer)]
        foreign_keys: i32,
    }

    #[test]
    fn run_migrations_creates_tables() {
        let pool = create_pool(&EmbeddedDatabase::Memory).unwrap();
        let applied = run_migrations(&pool).unwrap();
        assert_eq!(applied.len(), 1);

        let mut conn = pool.get().unwrap();
        let tables: Vec<String> = diesel::sql_query(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name",
        )
        .load::<TableName>(&mut conn)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();

        assert_eq!(tables, vec!["cases".to_string(), "events".to_string()]);
    }

    #[test]
    fn run_migrations_is_idempotent() {
        let pool = create_pool(&EmbeddedDatabase::Memory).unwrap();
        assert!(!run_migrations(&pool).unwrap().is_empty());
        assert!(run_migrations(&pool).unwrap().is_empty());
        assert!(run_migrations(&pool).unwrap().is_empty());
    }

    #[test]
    fn pooled_connections_enforce_foreign_keys() {
        let pool = create_pool(&EmbeddedDatabase::Memory).unwrap();
        let mut conn = pool.get().unwrap();
        let flag: Vec<Flag> = diesel::sql_query("PRAGMA foreign_keys")
            .load(&mut conn)
            .unwrap();
        assert_eq!(flag[0].foreign_keys, 1);
    }
}
