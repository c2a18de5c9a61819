use clap::Parser;
use tracing::error;

use procmine::adapter::inbound::cli::command::Cli;
use procmine::adapter::inbound::cli::output::{self, OutputConfig};
use procmine::adapter::inbound::cli::dispatch;
use procmine::infrastructure::config::Settings;
use procmine::infrastructure::operator::Operator;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            output::error(&format!("Failed to load configuration: {e}"));
            std::process::exit(e.exit_code());
        }
    };
    settings.logging.init();
    let operator = Operator::new(settings);

    if let Err(e) = dispatch(cli.command, &operator).await {
        error!(error = %e, "Fatal error");
        output::error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}
