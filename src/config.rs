use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::orchestrator::{BuildPlan, Release};

/// Looked up in the working directory when no `--config` is given.
pub const CONFIG_FILENAME: &str = "release-builder.toml";

/// Set to answer the install prompt with "yes" without reading stdin.
pub const ASSUME_YES_ENV: &str = "RELEASE_BUILDER_ASSUME_YES";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReleaseToml {
    project: Option<ProjectToml>,
    targets: Option<TargetsToml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectToml {
    name: Option<String>,
    target_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TargetsToml {
    enable: Option<Vec<String>>,
    disable: Option<Vec<String>>,
}

/// Load the release settings.
///
/// An explicit path must exist. Without one, a missing
/// [`CONFIG_FILENAME`] in `cwd` means built-in defaults.
pub fn load_release(cwd: &Path, explicit: Option<&Path>) -> Result<Release> {
    let config_path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default_path = cwd.join(CONFIG_FILENAME);
            if !default_path.is_file() {
                return Ok(Release::default());
            }
            default_path
        }
    };

    let text = fs::read_to_string(&config_path)
        .with_context(|| format!("reading release config '{}'", config_path.display()))?;
    parse_release(&text, &config_path)
}

fn parse_release(text: &str, config_path: &Path) -> Result<Release> {
    let parsed: ReleaseToml = toml::from_str(text)
        .with_context(|| format!("parsing release config '{}'", config_path.display()))?;

    let mut plan = BuildPlan::default();

    if let Some(project) = parsed.project {
        if let Some(name) = project.name {
            let name = name.trim();
            if name.is_empty() || name.contains(['/', '\\']) {
                bail!(
                    "invalid release config '{}': project name '{}' must be a bare binary name",
                    config_path.display(),
                    name
                );
            }
            plan.project = name.to_string();
        }
        if let Some(target_dir) = project.target_dir {
            plan.target_dir = target_dir;
        }
    }

    if let Some(targets) = parsed.targets {
        for triple in targets.enable.unwrap_or_default() {
            plan.targets
                .set_enabled(triple.trim(), true)
                .with_context(|| format!("invalid release config '{}'", config_path.display()))?;
        }
        for triple in targets.disable.unwrap_or_default() {
            plan.targets
                .set_enabled(triple.trim(), false)
                .with_context(|| format!("invalid release config '{}'", config_path.display()))?;
        }
    }

    if plan.targets.enabled().next().is_none() {
        bail!(
            "invalid release config '{}': every target is disabled",
            config_path.display()
        );
    }

    Ok(Release {
        plan,
        ..Release::default()
    })
}

/// Whether an env value means "yes". Uses the same rule as the prompt.
pub fn assume_yes_from_env(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        crate::install::ConsentDecision::parse(v) == crate::install::ConsentDecision::Accepted
    })
}
