//! Child-process adapters: shell migrations and the server hand-off.

mod launcher;
mod migrator;

pub use launcher::ExecLauncher;
pub use migrator::CommandMigrator;
