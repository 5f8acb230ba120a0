//! Consent-gated installation of the cross-build helper.
//!
//! The helper (`cargo-zigbuild`) is not required up front, but no build can
//! run without it. When it is missing the operator is asked once; declining
//! ends the run.

use std::io::{self, BufRead, Write};

use crate::error::ReleaseError;
use crate::preflight::ToolResolver;
use crate::process::{CommandRunner, CommandSpec};

/// A tool that can be installed on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalTool {
    pub name: String,
    pub description: String,
    pub install_command: CommandSpec,
}

impl OptionalTool {
    /// The `cargo-zigbuild` helper, installed through cargo.
    pub fn cargo_zigbuild() -> Self {
        Self {
            name: "cargo-zigbuild".to_string(),
            description: "cargo-zigbuild[.exe]".to_string(),
            install_command: CommandSpec::new(
                "cargo",
                ["install", "--locked", "cargo-zigbuild"],
            ),
        }
    }

    fn question(&self) -> String {
        format!(
            "Need {} installed, ok to install? (declining exits without building) ",
            self.description
        )
    }
}

/// Operator's answer to the install prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentDecision {
    Accepted,
    Declined,
}

impl ConsentDecision {
    /// Interpret a raw answer.
    ///
    /// Affirmative when the first character of the trimmed, lowercased input
    /// is `y`, `1` or `t`. Everything else, including empty input, declines.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().chars().next() {
            Some('y' | '1' | 't') => Self::Accepted,
            _ => Self::Declined,
        }
    }
}

/// Source of consent answers.
pub trait ConsentPrompt {
    fn ask(&mut self, question: &str) -> Result<ConsentDecision, ReleaseError>;
}

/// Reads one line from a reader after writing the question to a writer.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LinePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's stdin/stdout. Blocks until a line is read.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsentPrompt for LinePrompt<R, W> {
    fn ask(&mut self, question: &str) -> Result<ConsentDecision, ReleaseError> {
        write!(self.output, "{question}").map_err(ReleaseError::Prompt)?;
        self.output.flush().map_err(ReleaseError::Prompt)?;

        // bytes, so undecodable input declines rather than erroring
        let mut line = Vec::new();
        self.input
            .read_until(b'\n', &mut line)
            .map_err(ReleaseError::Prompt)?;
        Ok(ConsentDecision::parse(&String::from_utf8_lossy(&line)))
    }
}

/// Answers every prompt the same way without reading input.
#[derive(Debug, Clone, Copy)]
pub struct FixedConsent(pub ConsentDecision);

impl ConsentPrompt for FixedConsent {
    fn ask(&mut self, _question: &str) -> Result<ConsentDecision, ReleaseError> {
        Ok(self.0)
    }
}

/// Result of [`ensure_optional_tool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyPresent,
    InstalledNow,
}

/// Make sure `tool` is available, installing it with consent if needed.
///
/// The tool is not re-resolved after a successful install; the install
/// command's exit status is taken as proof.
pub fn ensure_optional_tool<R, P, C>(
    tool: &OptionalTool,
    resolver: &R,
    prompt: &mut P,
    runner: &mut C,
) -> Result<InstallOutcome, ReleaseError>
where
    R: ToolResolver + ?Sized,
    P: ConsentPrompt + ?Sized,
    C: CommandRunner + ?Sized,
{
    if resolver.resolve(&tool.name).is_some() {
        return Ok(InstallOutcome::AlreadyPresent);
    }

    if prompt.ask(&tool.question())? == ConsentDecision::Declined {
        return Err(ReleaseError::DeclinedInstallation {
            tool: tool.name.clone(),
        });
    }

    let status = runner.run(&tool.install_command)?;
    if !status.success {
        return Err(ReleaseError::InstallationFailed {
            tool: tool.name.clone(),
            command: tool.install_command.clone(),
            status: status.to_string(),
        });
    }

    Ok(InstallOutcome::InstalledNow)
}
