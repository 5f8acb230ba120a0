//! Release artifact discovery.
//!
//! Candidate paths are computed by [`candidate_paths`] without touching the
//! filesystem; [`locate_binary`] then checks them in order.

use std::path::{Path, PathBuf};

use crate::error::ReleaseError;
use crate::targets::TargetTriple;

/// Executable suffix checked before the bare name.
const EXE_SUFFIX: &str = ".exe";

/// Where cargo places the release binary for `project` built for `triple`.
///
/// The `.exe` form comes first for every triple; at most one of the two is
/// expected to exist after a build.
pub fn candidate_paths(target_dir: &Path, triple: &TargetTriple, project: &str) -> Vec<PathBuf> {
    let release_dir = target_dir.join(triple.as_str()).join("release");
    vec![
        release_dir.join(format!("{project}{EXE_SUFFIX}")),
        release_dir.join(project),
    ]
}

/// Return the absolute path of the first existing candidate.
///
/// Relative `target_dir` values resolve against the current directory.
/// Symlinks are not followed.
pub fn locate_binary(
    target_dir: &Path,
    triple: &TargetTriple,
    project: &str,
) -> Result<PathBuf, ReleaseError> {
    let candidates = candidate_paths(target_dir, triple, project);
    match candidates.iter().find(|c| c.exists()) {
        Some(found) => Ok(std::path::absolute(found)?),
        None => Err(ReleaseError::ArtifactNotFound {
            triple: triple.clone(),
            candidates,
        }),
    }
}
