//! Handler for the `migrate` command.

use serde_json::json;

use crate::adapter::inbound::cli::command::MigrateArgs;
use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::port::OperatorPort;

/// Execute the migrate command: the entrypoint's setup without a hand-off.
pub async fn execute(operator: &dyn OperatorPort, args: MigrateArgs) -> Result<()> {
    let pb = output::spinner("Migrating database");
    let outcome = match operator.migrate(args.migrate_command).await {
        Ok(outcome) => outcome,
        Err(e) => {
            output::spinner_fail(&pb, "Migration failed");
            return Err(e);
        }
    };

    if output::is_json() {
        pb.finish_and_clear();
        output::json_output(json!({
            "command": "migrate",
            "database": outcome.database,
            "endpoint": outcome.endpoint.as_ref().map(ToString::to_string),
            "applied": outcome.applied,
        }));
        return Ok(());
    }

    let applied = outcome.applied.len();
    if applied == 0 {
        output::spinner_success(&pb, "Database schema is up to date");
    } else {
        output::spinner_success(&pb, &format!("Applied {applied} migration(s)"));
    }
    if output::verbosity() > 0 {
        for version in &outcome.applied {
            output::field("Applied", version);
        }
    }
    Ok(())
}
