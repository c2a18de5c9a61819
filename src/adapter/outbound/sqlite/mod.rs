//! SQLite persistence adapters.
//!
//! Provides the SQLite-backed event store and the embedded migrator using
//! Diesel ORM.

pub mod database;
pub mod migrator;
pub mod store;

pub use migrator::EmbeddedMigrator;
pub use store::SqliteEventStore;
