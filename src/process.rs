//! Subprocess invocation.
//!
//! Every external tool (installer, cross-build) runs through [`CommandRunner`]
//! so the build flow can be exercised in tests without spawning processes.

use std::fmt;
use std::process::Command;

use crate::error::ReleaseError;

/// A program and its ordered argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How a finished subprocess exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStatus {
    pub success: bool,
    /// Exit code, or `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl RunStatus {
    pub fn from_code(code: i32) -> Self {
        Self {
            success: code == 0,
            code: Some(code),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status: {code}"),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Runs a command to completion.
pub trait CommandRunner {
    fn run(&mut self, command: &CommandSpec) -> Result<RunStatus, ReleaseError>;
}

/// Runs commands as real child processes, inheriting cwd and stdio.
///
/// Blocks until the child exits. There is no timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, command: &CommandSpec) -> Result<RunStatus, ReleaseError> {
        let status = Command::new(&command.program)
            .args(&command.args)
            .status()
            .map_err(|source| ReleaseError::Spawn {
                command: command.clone(),
                source,
            })?;

        Ok(RunStatus {
            success: status.success(),
            code: status.code(),
        })
    }
}
