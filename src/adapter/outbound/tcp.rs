//! TCP reachability probe.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::domain::Endpoint;
use crate::port::ConnectivityProbe;

/// Treats an accepted TCP connection as "the database is up".
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProbe;

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn probe(&self, endpoint: &Endpoint, limit: Duration) -> bool {
        let addr = (endpoint.host.as_str(), endpoint.port);
        match timeout(limit, TcpStream::connect(addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(endpoint = %endpoint, error = %e, "Probe refused");
                false
            }
            Err(_) => {
                debug!(endpoint = %endpoint, timeout_ms = limit.as_millis() as u64, "Probe timed out");
                false
            }
        }
    }
}
