// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! External process execution.
//!
//! Every package manager, download, and build step archup performs is an
//! external process. Commands are always described as an argument vector
//! through [`Invocation`], never as a shell string, so user supplied search
//! terms reach the child process as a single argument without any quoting.
//!
//! Two execution styles exist. [`Runner::capture`] collects the output of a
//! command so it can be parsed, e.g., `pacman -Ss`. [`Runner::run`] executes a
//! command whose output is meant for the user, either streamed to the
//! terminal or discarded depending on the active [`Verbosity`].

use std::{
    ffi::{OsStr, OsString},
    fmt::{Display, Formatter, Result as FmtResult},
    path::PathBuf,
    process::{Command, Stdio},
};
use tracing::{debug, instrument};

/// Output verbosity for commands whose output is meant for the user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Discard command output and show a progress indicator instead.
    Quiet,

    /// Stream command output straight to the terminal.
    #[default]
    Verbose,
}

impl Verbosity {
    pub fn is_quiet(&self) -> bool {
        matches!(self, Self::Quiet)
    }
}

/// Command line described as an argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
}

impl Invocation {
    /// Construct new invocation of target program with no arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a sequence of arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<OsString>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the program from target directory.
    pub fn current_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(path.into());
        self
    }

    pub fn program(&self) -> &OsStr {
        self.program.as_os_str()
    }

    pub fn arguments(&self) -> &[OsString] {
        self.args.as_slice()
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

impl Display for Invocation {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.program.to_string_lossy().as_ref())?;
        for arg in &self.args {
            fmt.write_str(" ")?;
            fmt.write_str(arg.to_string_lossy().as_ref())?;
        }

        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Captured {
    /// Process exited with status zero.
    pub success: bool,

    /// Everything written to stdout.
    pub stdout: String,

    /// Everything written to stderr.
    pub stderr: String,
}

/// Layer of indirection for process execution.
pub trait Runner {
    /// Run command to completion and capture its output.
    ///
    /// # Errors
    ///
    /// - Return [`ProcessError::Spawn`] if the process cannot be started.
    fn capture(&self, invocation: &Invocation) -> Result<Captured>;

    /// Run command to completion with output shown or discarded according to
    /// verbosity. Returns true if the process exited with status zero.
    ///
    /// # Errors
    ///
    /// - Return [`ProcessError::Spawn`] if the process cannot be started.
    fn run(&self, invocation: &Invocation, verbosity: Verbosity) -> Result<bool>;

    /// Check if command succeeds, treating spawn failure as failure.
    fn succeeds(&self, invocation: &Invocation) -> bool {
        self.run(invocation, Verbosity::Quiet).unwrap_or(false)
    }
}

/// Process execution through [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    #[instrument(skip(self), fields(command = %invocation), level = "debug")]
    fn capture(&self, invocation: &Invocation) -> Result<Captured> {
        let output = invocation
            .to_command()
            .stdin(Stdio::null())
            .output()
            .map_err(|err| ProcessError::Spawn {
                source: err,
                program: invocation.program.clone(),
            })?;

        let captured = Captured {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(output.stdout.as_slice()).into_owned(),
            stderr: String::from_utf8_lossy(output.stderr.as_slice()).into_owned(),
        };
        debug!("exit status: {}", output.status);

        Ok(captured)
    }

    #[instrument(skip(self), fields(command = %invocation), level = "debug")]
    fn run(&self, invocation: &Invocation, verbosity: Verbosity) -> Result<bool> {
        let mut command = invocation.to_command();
        if verbosity.is_quiet() {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let status = command
            .spawn()
            .and_then(|mut child| child.wait())
            .map_err(|err| ProcessError::Spawn {
                source: err,
                program: invocation.program.clone(),
            })?;
        debug!("exit status: {status}");

        Ok(status.success())
    }
}

/// All possible error types for process execution.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// Process could not be started, e.g., program is not installed.
    #[error("failed to run {program:?}")]
    Spawn {
        #[source]
        source: std::io::Error,
        program: OsString,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ProcessError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn invocation_display_joins_arguments() {
        let invocation = Invocation::new("pacman").args(["-Ss", "neo vim"]);
        assert_eq!(invocation.to_string(), "pacman -Ss neo vim");
        assert_eq!(invocation.arguments().len(), 2);
    }

    #[test]
    fn spawn_failure_is_distinct_error() {
        let result = SystemRunner.capture(&Invocation::new("archup-no-such-program-here"));
        assert!(matches!(result, Err(ProcessError::Spawn { .. })));
        assert!(!SystemRunner.succeeds(&Invocation::new("archup-no-such-program-here")));
    }

    #[cfg(unix)]
    #[test]
    fn capture_keeps_search_term_as_one_argument() -> anyhow::Result<()> {
        let captured = SystemRunner.capture(&Invocation::new("printf").args(["%s|", "a b; rm -rf /"]))?;
        assert!(captured.success);
        assert_eq!(captured.stdout, "a b; rm -rf /|");

        Ok(())
    }
}
