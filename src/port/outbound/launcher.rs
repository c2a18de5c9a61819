//! Server hand-off port.

use std::fmt;

use crate::domain::Endpoint;
use crate::error::{ConfigError, LaunchError};

/// Command the entrypoint hands control to once setup succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Variables set on top of the inherited environment.
    pub env: Vec<(String, String)>,
}

impl StartupCommand {
    /// Build from an argument vector such as the one after `--`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyCommand`] when `argv` is empty or its program is
    /// blank.
    pub fn from_argv(argv: Vec<String>) -> Result<Self, ConfigError> {
        let mut argv = argv.into_iter();
        match argv.next() {
            Some(program) if !program.trim().is_empty() => Ok(Self {
                program,
                args: argv.collect(),
                env: Vec::new(),
            }),
            _ => Err(ConfigError::EmptyCommand),
        }
    }

    /// Point the command at the endpoint that answered the readiness poll.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: &Endpoint) -> Self {
        self.env.push(("DB_HOST".to_string(), endpoint.host.clone()));
        self.env.push(("DB_PORT".to_string(), endpoint.port.to_string()));
        self
    }
}

impl fmt::Display for StartupCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Hands the process over to the startup command.
pub trait Launcher: Send + Sync {
    /// Launch the command.
    ///
    /// A process-replacing launcher only returns on failure. Other launchers
    /// return `Ok(())` once the command has finished successfully.
    fn launch(&self, command: &StartupCommand) -> Result<(), LaunchError>;
}
