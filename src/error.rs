//! Error types for release builds.

use std::path::PathBuf;

use thiserror::Error;

use crate::process::CommandSpec;
use crate::targets::TargetTriple;

/// Fatal conditions that abort a release run.
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("required binary \"{tool}\" does not exist. Install and re-run.")]
    MissingRequiredTool { tool: String },

    #[error("cannot install {tool} without consent, exiting.")]
    DeclinedInstallation { tool: String },

    #[error("installing {tool} failed ({status}): `{command}`")]
    InstallationFailed {
        tool: String,
        command: CommandSpec,
        status: String,
    },

    #[error("build for \"{triple}\" failed ({status})")]
    BuildFailed { triple: TargetTriple, status: String },

    #[error("cannot find a binary for {triple}; checked: {}", display_paths(.candidates))]
    ArtifactNotFound {
        triple: TargetTriple,
        candidates: Vec<PathBuf>,
    },

    #[error("unsupported target '{triple}'; expected one of: {expected}")]
    UnknownTarget { triple: String, expected: String },

    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: CommandSpec,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read operator input: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReleaseError {
    /// Process exit code for this failure. Always non-zero.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::MissingRequiredTool { .. } => 2,
            Self::DeclinedInstallation { .. } => 3,
            Self::InstallationFailed { .. } => 4,
            Self::BuildFailed { .. } => 5,
            Self::ArtifactNotFound { .. } => 6,
            Self::UnknownTarget { .. } | Self::Spawn { .. } | Self::Prompt(_) | Self::Io(_) => 1,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
