//! Schema migration port.

use crate::domain::Endpoint;
use crate::error::MigrationError;

/// Brings the database schema up to date.
///
/// Implementations must be idempotent: running against a current schema
/// applies nothing and succeeds.
pub trait Migrator: Send + Sync {
    /// Human-readable description for logs.
    fn describe(&self) -> String;

    /// Apply pending migrations, returning the versions applied.
    ///
    /// `endpoint` is the networked endpoint that passed the readiness
    /// check, if any. Blocking; callers run it off the async executor.
    fn migrate(&self, endpoint: Option<&Endpoint>) -> Result<Vec<String>, MigrationError>;
}
