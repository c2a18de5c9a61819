//! Database reachability port.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::Endpoint;

/// Checks whether a database endpoint accepts connections.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Probe the endpoint once, giving up after `timeout`.
    ///
    /// Failures are expected while the database is starting, so the probe
    /// reports reachability instead of an error.
    async fn probe(&self, endpoint: &Endpoint, timeout: Duration) -> bool;
}
