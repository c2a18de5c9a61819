//! Handler for the `dashboard` command.

use crate::error::Result;
use crate::port::OperatorPort;

/// Run the dashboard service until Ctrl-C or SIGTERM.
pub async fn execute(operator: &dyn OperatorPort) -> Result<()> {
    operator.serve_dashboard().await
}
