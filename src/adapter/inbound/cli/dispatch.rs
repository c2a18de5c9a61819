//! Subcommand dispatch.

use super::command::Commands;
use super::{dashboard, entrypoint, generate, healthcheck, load, migrate, report, serve, train};
use crate::error::Result;
use crate::port::OperatorPort;

/// Run one parsed subcommand.
///
/// # Errors
///
/// Whatever the subcommand fails with; the caller maps it to an exit code.
pub async fn dispatch(command: Commands, operator: &dyn OperatorPort) -> Result<()> {
    match command {
        Commands::Entrypoint(args) => entrypoint::execute(operator, args).await,
        Commands::Migrate(args) => migrate::execute(operator, args).await,
        Commands::Serve => serve::execute(operator).await,
        Commands::Dashboard => dashboard::execute(operator).await,
        Commands::LoadEvents(args) => load::execute(operator, &args).await,
        Commands::Generate(args) => generate::execute(&args),
        Commands::Train => train::execute(operator).await,
        Commands::Check(args) => healthcheck::execute(operator, args).await,
        Commands::Report => report::execute(operator).await,
    }
}
