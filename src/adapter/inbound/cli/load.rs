//! Handler for the `load-events` command.

use serde_json::json;

use crate::adapter::inbound::cli::command::LoadEventsArgs;
use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::port::OperatorPort;

/// Import a CSV event log into the configured database.
pub async fn execute(operator: &dyn OperatorPort, args: &LoadEventsArgs) -> Result<()> {
    let content = tokio::fs::read_to_string(&args.csv).await?;

    let pb = output::spinner(&format!("Loading {}", args.csv.display()));
    let summary = match operator.load_events(content).await {
        Ok(summary) => summary,
        Err(e) => {
            output::spinner_fail(&pb, "Import failed, nothing was written");
            return Err(e);
        }
    };

    if output::is_json() {
        pb.finish_and_clear();
        output::json_output(json!({
            "command": "load-events",
            "file": args.csv.display().to_string(),
            "summary": summary,
        }));
        return Ok(());
    }

    output::spinner_success(
        &pb,
        &format!("Loaded {} events from {}", summary.events, args.csv.display()),
    );
    output::field("Cases created", summary.cases_created);
    output::field("Cases updated", summary.cases_updated);
    Ok(())
}
