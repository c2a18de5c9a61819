//! Hand-off to the server command.

use std::process::Command;

use crate::error::LaunchError;
use crate::port::{Launcher, StartupCommand};

/// Replaces the current process with the startup command.
///
/// On Unix this is `execvp`, so the server becomes the container's main
/// process and receives its signals directly. Elsewhere the command is
/// spawned and waited on, and a failing exit status is reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecLauncher;

fn build(command: &StartupCommand) -> Command {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args);
    cmd.envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    cmd
}

impl Launcher for ExecLauncher {
    #[cfg(unix)]
    fn launch(&self, command: &StartupCommand) -> Result<(), LaunchError> {
        use std::os::unix::process::CommandExt;

        // only returns on failure
        let source = build(command).exec();
        Err(LaunchError::Exec {
            program: command.program.clone(),
            source,
        })
    }

    #[cfg(not(unix))]
    fn launch(&self, command: &StartupCommand) -> Result<(), LaunchError> {
        let status = build(command)
            .status()
            .map_err(|source| LaunchError::Exec {
                program: command.program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(LaunchError::ChildFailed {
                program: command.program.clone(),
                status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_fails_without_replacing_the_process() {
        let command = StartupCommand::from_argv(vec![
            "/nonexistent/procmine-server-binary".to_string(),
        ])
        .unwrap();
        let err = ExecLauncher.launch(&command).unwrap_err();
        assert!(matches!(err, LaunchError::Exec { .. }));
    }
}
