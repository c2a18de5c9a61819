//! Handler for the `serve` command.

use crate::error::Result;
use crate::port::OperatorPort;

/// Run the REST API until Ctrl-C or SIGTERM.
pub async fn execute(operator: &dyn OperatorPort) -> Result<()> {
    operator.serve_api().await
}
