use std::path::{Path, PathBuf};

use procmine::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
use procmine::adapter::outbound::sqlite::SqliteEventStore;
use procmine::domain::EmbeddedDatabase;
use tempfile::TempDir;

/// Temporary SQLite database file for integration tests.
///
/// The directory (and the database in it) is removed on drop.
pub struct TempDb {
    dir: TempDir,
    path: PathBuf,
}

impl TempDb {
    pub fn create(name: &str) -> Self {
        let dir = tempfile::Builder::new()
            .prefix(&format!("procmine-{name}-"))
            .tempdir()
            .expect("create temp dir");
        let path = dir.path().join("db.sqlite3");
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// `DATABASE_URL` pointing at this database.
    pub fn url(&self) -> String {
        format!("sqlite://{}", self.path.display())
    }

    /// A migrated store over this database; every call opens a new pool.
    pub fn store(&self) -> SqliteEventStore {
        let pool = create_pool(&EmbeddedDatabase::File(self.path.clone())).expect("create pool");
        run_migrations(&pool).expect("run migrations");
        SqliteEventStore::new(pool)
    }
}
