//! Preflight checks for release builds.
//!
//! Validates that the host has the toolchain binaries every later step
//! shells out to. Runs before the installer prompt and before any build.
//!
//! # Example
//!
//! ```rust
//! use release_builder::preflight::{check_required_tools, command_exists, PathResolver};
//!
//! if !command_exists("zig") {
//!     println!("zig not installed");
//! }
//!
//! if let Err(e) = check_required_tools(&PathResolver, &["cargo", "zig"]) {
//!     eprintln!("{}", e);
//! }
//! ```

use std::path::PathBuf;

use crate::error::ReleaseError;

/// Toolchain binaries that must be on `PATH` before anything else runs.
pub const REQUIRED_TOOLS: &[&str] = &["cargo", "zig"];

/// Resolves an executable name to a path.
pub trait ToolResolver {
    fn resolve(&self, tool: &str) -> Option<PathBuf>;
}

/// Looks tools up on the current `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathResolver;

impl ToolResolver for PathResolver {
    fn resolve(&self, tool: &str) -> Option<PathBuf> {
        which::which(tool).ok()
    }
}

/// Check if a command exists on the host system.
pub fn command_exists(cmd: &str) -> bool {
    PathResolver.resolve(cmd).is_some()
}

/// Check that every tool resolves, in order.
///
/// Stops at the first missing tool and names it in the error; later tools
/// are not checked.
pub fn check_required_tools<R>(resolver: &R, tools: &[&str]) -> Result<(), ReleaseError>
where
    R: ToolResolver + ?Sized,
{
    for tool in tools {
        if resolver.resolve(tool).is_none() {
            return Err(ReleaseError::MissingRequiredTool {
                tool: (*tool).to_string(),
            });
        }
    }
    Ok(())
}
