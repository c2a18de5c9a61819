//! Ready-to-use event stores.

use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
use crate::adapter::outbound::sqlite::SqliteEventStore;
use crate::domain::EmbeddedDatabase;
use crate::port::EventStore;

use super::domain::sample_events;

/// Migrated in-memory store with no events.
///
/// # Panics
///
/// Panics when the in-memory database cannot be created.
pub fn empty_store() -> SqliteEventStore {
    let pool = create_pool(&EmbeddedDatabase::Memory).expect("in-memory pool");
    run_migrations(&pool).expect("migrations");
    SqliteEventStore::new(pool)
}

/// Migrated in-memory store holding the sample log.
///
/// # Panics
///
/// Panics when the sample events cannot be ingested.
pub async fn sample_store() -> SqliteEventStore {
    let store = empty_store();
    store.ingest(sample_events()).await.expect("ingest sample");
    store
}
