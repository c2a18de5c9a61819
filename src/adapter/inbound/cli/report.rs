//! Handler for the `report` command.

use serde_json::json;
use tabled::Tabled;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::port::OperatorPort;

#[derive(Tabled)]
struct BottleneckRow {
    #[tabled(rename = "Activity")]
    activity: String,
    #[tabled(rename = "Avg Wait (h)")]
    avg_hours: String,
}

/// Print the cycle-time summary and the bottleneck table.
pub async fn execute(operator: &dyn OperatorPort) -> Result<()> {
    let metrics = operator.report().await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "report",
            "metrics": metrics.metrics,
            "bottleneck": metrics.bottleneck,
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    let summary = &metrics.metrics;
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Cases", summary.total_cases);
    output::field("Events", summary.total_events);
    output::field("Avg cycle (h)", format!("{:.1}", summary.avg_cycle_time_hours));
    output::field("Max cycle (h)", format!("{:.1}", summary.max_cycle_time_hours));

    if metrics.bottleneck.is_empty() {
        output::hint("no events yet; import some with `procmine load-events <csv>`");
        return Ok(());
    }

    output::section("Bottlenecks");
    output::table(metrics.bottleneck.iter().map(|b| BottleneckRow {
        activity: b.activity.clone(),
        avg_hours: format!("{:.2}", b.avg_hours),
    }));
    Ok(())
}
