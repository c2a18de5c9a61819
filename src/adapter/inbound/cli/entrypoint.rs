//! Handler for the `entrypoint` command.

use crate::adapter::inbound::cli::command::EntrypointArgs;
use crate::error::Result;
use crate::port::inbound::operator::EntrypointRequest;
use crate::port::OperatorPort;

/// Execute the entrypoint command.
///
/// Configuration problems (empty command, unparseable `DATABASE_URL`, a
/// networked database without a migrate command) surface before any
/// waiting starts. On Unix a successful run never returns.
pub async fn execute(operator: &dyn OperatorPort, args: EntrypointArgs) -> Result<()> {
    operator
        .entrypoint(EntrypointRequest {
            migrate_command: args.migrate_command,
            command: args.command,
        })
        .await
}
