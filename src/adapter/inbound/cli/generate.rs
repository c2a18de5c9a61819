//! Handler for the `generate` command.

use serde_json::json;

use crate::adapter::inbound::cli::command::GenerateArgs;
use crate::adapter::inbound::cli::output;
use crate::domain::ingest::events_to_csv;
use crate::domain::synthetic::{generate, SyntheticConfig};
use crate::error::{ConfigError, Result};

/// Write a synthetic event log.
pub fn execute(args: &GenerateArgs) -> Result<()> {
    if args.min_events == 0 || args.min_events > args.max_events {
        return Err(ConfigError::InvalidValue {
            field: "--min-events",
            reason: format!(
                "must be between 1 and --max-events ({}), got {}",
                args.max_events, args.min_events
            ),
        }
        .into());
    }

    let config = SyntheticConfig {
        cases: args.cases,
        min_events: args.min_events,
        max_events: args.max_events,
        seed: args.seed,
        ..SyntheticConfig::default()
    };
    let events = generate(&config);

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&args.output, events_to_csv(&events))?;

    if output::is_json() {
        output::json_output(json!({
            "command": "generate",
            "output": args.output.display().to_string(),
            "cases": config.cases,
            "events": events.len(),
        }));
        return Ok(());
    }

    output::success(&format!(
        "Wrote {} events for {} cases to {}",
        events.len(),
        config.cases,
        output::highlight(args.output.display())
    ));
    output::hint(&format!(
        "import it with {}",
        output::highlight(format!("procmine load-events {}", args.output.display()))
    ));
    Ok(())
}
