//! Handler for the `check` command, used by container health checks.

use serde_json::json;

use crate::adapter::inbound::cli::command::CheckArgs;
use crate::adapter::inbound::cli::output;
use crate::error::{Error, Result};
use crate::port::OperatorPort;

/// `GET <url>/health` once; succeed only on a 2xx answer.
pub async fn execute(operator: &dyn OperatorPort, args: CheckArgs) -> Result<()> {
    let health = operator.check(args.url).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "check",
            "url": health.url,
            "status": health.status,
            "healthy": health.healthy,
        }));
    } else if health.healthy {
        output::success(&format!("{} is healthy", health.url));
    } else {
        output::error(&format!("{} answered {}", health.url, health.status));
    }

    if health.healthy {
        Ok(())
    } else {
        Err(Error::Connection(format!(
            "{}/health answered {}",
            health.url, health.status
        )))
    }
}
