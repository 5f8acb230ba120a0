//! Sequential multi-target release build.
//!
//! One run: preflight, helper install, then each enabled triple in catalog
//! order. The first failure of any kind ends the run; triples after it are
//! never attempted.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ReleaseError;
use crate::install::{ensure_optional_tool, ConsentPrompt, InstallOutcome, OptionalTool};
use crate::locate::locate_binary;
use crate::preflight::{check_required_tools, ToolResolver, REQUIRED_TOOLS};
use crate::process::{CommandRunner, CommandSpec};
use crate::targets::{TargetSet, TargetTriple};

/// Project whose release binary is built when nothing else is configured.
pub const DEFAULT_PROJECT: &str = "cyber-reachability";

/// Cargo output root, relative to the working directory.
pub const DEFAULT_TARGET_DIR: &str = "target";

/// What to build and where the outputs land.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub project: String,
    pub target_dir: PathBuf,
    pub targets: TargetSet,
}

impl Default for BuildPlan {
    fn default() -> Self {
        Self {
            project: DEFAULT_PROJECT.to_string(),
            target_dir: PathBuf::from(DEFAULT_TARGET_DIR),
            targets: TargetSet::default(),
        }
    }
}

/// Everything a full run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct Release {
    pub required_tools: Vec<String>,
    pub helper: OptionalTool,
    pub plan: BuildPlan,
}

impl Default for Release {
    fn default() -> Self {
        Self {
            required_tools: REQUIRED_TOOLS.iter().map(|t| t.to_string()).collect(),
            helper: OptionalTool::cargo_zigbuild(),
            plan: BuildPlan::default(),
        }
    }
}

/// A located release binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArtifact {
    pub triple: TargetTriple,
    pub path: PathBuf,
}

/// `cargo zigbuild --release --target <triple> [--target-dir <dir>]`
///
/// `--target-dir` is only passed when the plan moves the output root away
/// from cargo's default, so cargo writes where [`locate_binary`] looks.
pub fn build_command(plan: &BuildPlan, triple: &TargetTriple) -> CommandSpec {
    let mut command = CommandSpec::new(
        "cargo",
        ["zigbuild", "--release", "--target", triple.as_str()],
    );
    if plan.target_dir != Path::new(DEFAULT_TARGET_DIR) {
        command.args.push("--target-dir".to_string());
        command
            .args
            .push(plan.target_dir.to_string_lossy().into_owned());
    }
    command
}

/// Build every enabled triple in order, stopping at the first failure.
pub fn build_targets<C, W>(
    plan: &BuildPlan,
    runner: &mut C,
    out: &mut W,
) -> Result<Vec<BuiltArtifact>, ReleaseError>
where
    C: CommandRunner + ?Sized,
    W: Write + ?Sized,
{
    plan.targets
        .enabled()
        .try_fold(Vec::new(), |mut built, triple| {
            built.push(build_one(plan, triple, &mut *runner, &mut *out)?);
            Ok(built)
        })
}

/// Build and locate a single triple.
pub fn build_one<C, W>(
    plan: &BuildPlan,
    triple: &TargetTriple,
    runner: &mut C,
    out: &mut W,
) -> Result<BuiltArtifact, ReleaseError>
where
    C: CommandRunner + ?Sized,
    W: Write + ?Sized,
{
    writeln!(out, "Building for \"{triple}\"")?;

    let status = runner.run(&build_command(plan, triple))?;
    if !status.success {
        return Err(ReleaseError::BuildFailed {
            triple: triple.clone(),
            status: status.to_string(),
        });
    }

    let path = locate_binary(&plan.target_dir, triple, &plan.project)?;
    writeln!(out, "[ Built ] {}", path.display())?;

    Ok(BuiltArtifact {
        triple: triple.clone(),
        path,
    })
}

/// Full run: required tools, helper, then the build loop.
pub fn run_release<R, P, C, W>(
    release: &Release,
    resolver: &R,
    prompt: &mut P,
    runner: &mut C,
    out: &mut W,
) -> Result<Vec<BuiltArtifact>, ReleaseError>
where
    R: ToolResolver + ?Sized,
    P: ConsentPrompt + ?Sized,
    C: CommandRunner + ?Sized,
    W: Write + ?Sized,
{
    let required: Vec<&str> = release.required_tools.iter().map(String::as_str).collect();
    check_required_tools(resolver, &required)?;

    if ensure_optional_tool(&release.helper, resolver, prompt, &mut *runner)?
        == InstallOutcome::InstalledNow
    {
        writeln!(out, "Installed {}", release.helper.name)?;
    }

    build_targets(&release.plan, runner, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::{ConsentDecision, FixedConsent};
    use crate::process::RunStatus;
    use crate::targets::TargetEntry;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Pretends to be cargo: records calls and, like real cargo, drops an
    /// artifact under `--target-dir` or `<cwd>/target` on success.
    struct FakeCargo {
        cwd: PathBuf,
        failing: Vec<&'static str>,
        skip_artifact: Vec<&'static str>,
        calls: Vec<CommandSpec>,
    }

    impl FakeCargo {
        fn new(cwd: &Path) -> Self {
            Self {
                cwd: cwd.to_path_buf(),
                failing: Vec::new(),
                skip_artifact: Vec::new(),
                calls: Vec::new(),
            }
        }

        fn built_triples(&self) -> Vec<String> {
            self.calls
                .iter()
                .filter(|c| c.args.first().map(String::as_str) == Some("zigbuild"))
                .filter_map(|c| flag_value(c, "--target"))
                .collect()
        }
    }

    fn flag_value(command: &CommandSpec, flag: &str) -> Option<String> {
        let pos = command.args.iter().position(|a| a == flag)?;
        command.args.get(pos + 1).cloned()
    }

    impl CommandRunner for FakeCargo {
        fn run(&mut self, command: &CommandSpec) -> Result<RunStatus, ReleaseError> {
            self.calls.push(command.clone());
            if command.args.first().map(String::as_str) != Some("zigbuild") {
                return Ok(RunStatus::from_code(0));
            }
            let Some(triple) = flag_value(command, "--target") else {
                return Ok(RunStatus::from_code(101));
            };
            if self.failing.iter().any(|f| *f == triple) {
                return Ok(RunStatus::from_code(1));
            }
            if !self.skip_artifact.iter().any(|s| *s == triple) {
                let target_dir = flag_value(command, "--target-dir")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET_DIR));
                let dir = self.cwd.join(target_dir).join(&triple).join("release");
                fs::create_dir_all(&dir).unwrap();
                let name = if triple.contains("windows") {
                    format!("{DEFAULT_PROJECT}.exe")
                } else {
                    DEFAULT_PROJECT.to_string()
                };
                fs::write(dir.join(name), b"bin").unwrap();
            }
            Ok(RunStatus::from_code(0))
        }
    }

    struct Tools(Vec<&'static str>);

    impl ToolResolver for Tools {
        fn resolve(&self, tool: &str) -> Option<PathBuf> {
            self.0.iter().any(|t| *t == tool).then(|| PathBuf::from(tool))
        }
    }

    fn plan(target_dir: &Path, triples: &[&'static str]) -> BuildPlan {
        let entries: Vec<TargetEntry> = triples
            .iter()
            .map(|t| TargetEntry {
                triple: *t,
                enabled: true,
            })
            .collect();
        BuildPlan {
            project: DEFAULT_PROJECT.to_string(),
            target_dir: target_dir.to_path_buf(),
            targets: TargetSet::from_entries(&entries),
        }
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_build_command_argv() {
        let cmd = build_command(
            &BuildPlan::default(),
            &TargetTriple::new("x86_64-apple-darwin"),
        );
        assert_eq!(
            cmd.to_string(),
            "cargo zigbuild --release --target x86_64-apple-darwin"
        );
    }

    #[test]
    fn test_build_command_passes_custom_target_dir() {
        let plan = BuildPlan {
            target_dir: PathBuf::from("out"),
            ..BuildPlan::default()
        };
        let cmd = build_command(&plan, &TargetTriple::new("x86_64-apple-darwin"));
        assert_eq!(
            cmd.to_string(),
            "cargo zigbuild --release --target x86_64-apple-darwin --target-dir out"
        );
    }

    #[test]
    fn test_custom_target_dir_is_where_artifact_is_found() {
        let temp = TempDir::new().unwrap();
        let target_dir = temp.path().join("out");
        let mut cargo = FakeCargo::new(temp.path());
        let mut out = Vec::new();

        let built = build_targets(
            &plan(&target_dir, &["x86_64-unknown-linux-gnu"]),
            &mut cargo,
            &mut out,
        )
        .unwrap();

        assert!(built[0].path.starts_with(&target_dir));
        assert!(!temp.path().join("target").exists());
    }

    #[test]
    fn test_builds_in_declared_order() {
        let temp = TempDir::new().unwrap();
        let triples = [
            "x86_64-unknown-linux-gnu",
            "x86_64-pc-windows-gnu",
            "x86_64-apple-darwin",
        ];
        let mut cargo = FakeCargo::new(temp.path());
        let mut out = Vec::new();

        let built = build_targets(&plan(temp.path(), &triples), &mut cargo, &mut out).unwrap();

        assert_eq!(cargo.built_triples(), triples);
        assert_eq!(built.len(), 3);
        assert!(built[1].path.ends_with("cyber-reachability.exe"));
        assert_eq!(output(out).matches("[ Built ] ").count(), 3);
    }

    #[test]
    fn test_second_failure_skips_third() {
        let temp = TempDir::new().unwrap();
        let triples = [
            "x86_64-pc-windows-gnu",
            "x86_64-unknown-linux-gnu",
            "x86_64-apple-darwin",
        ];
        let mut cargo = FakeCargo::new(temp.path());
        cargo.failing.push("x86_64-unknown-linux-gnu");
        let mut out = Vec::new();

        let err = build_targets(&plan(temp.path(), &triples), &mut cargo, &mut out).unwrap_err();

        assert!(matches!(err, ReleaseError::BuildFailed { ref triple, .. }
            if triple.as_str() == "x86_64-unknown-linux-gnu"));
        assert_eq!(cargo.built_triples(), &triples[..2]);
        let out = output(out);
        assert_eq!(out.matches("Building for").count(), 2);
        assert_eq!(out.matches("[ Built ]").count(), 1);
    }

    #[test]
    fn test_missing_artifact_aborts_run() {
        let temp = TempDir::new().unwrap();
        let triples = ["x86_64-unknown-linux-gnu", "x86_64-apple-darwin"];
        let mut cargo = FakeCargo::new(temp.path());
        cargo.skip_artifact.push("x86_64-unknown-linux-gnu");
        let mut out = Vec::new();

        let err = build_targets(&plan(temp.path(), &triples), &mut cargo, &mut out).unwrap_err();

        assert!(matches!(err, ReleaseError::ArtifactNotFound { .. }));
        assert_eq!(cargo.built_triples(), &triples[..1]);
    }

    #[test]
    fn test_full_run_success() {
        let temp = TempDir::new().unwrap();
        let release = Release {
            plan: plan(
                temp.path(),
                &["x86_64-unknown-linux-gnu", "x86_64-pc-windows-gnu"],
            ),
            ..Release::default()
        };
        let tools = Tools(vec!["cargo", "zig", "cargo-zigbuild"]);
        let mut cargo = FakeCargo::new(temp.path());
        let mut out = Vec::new();

        let built = run_release(
            &release,
            &tools,
            &mut FixedConsent(ConsentDecision::Declined),
            &mut cargo,
            &mut out,
        )
        .unwrap();

        assert_eq!(built.len(), 2);
        let out = output(out);
        let built_lines: Vec<_> = out.lines().filter(|l| l.starts_with("[ Built ] ")).collect();
        assert_eq!(built_lines.len(), 2);
        for artifact in &built {
            assert!(artifact.path.is_absolute());
            assert!(artifact.path.is_file());
        }
    }

    #[test]
    fn test_missing_zig_stops_before_builds() {
        let temp = TempDir::new().unwrap();
        let release = Release {
            plan: plan(temp.path(), &["x86_64-unknown-linux-gnu"]),
            ..Release::default()
        };
        let mut cargo = FakeCargo::new(temp.path());
        let mut out = Vec::new();

        let err = run_release(
            &release,
            &Tools(vec!["cargo", "cargo-zigbuild"]),
            &mut FixedConsent(ConsentDecision::Accepted),
            &mut cargo,
            &mut out,
        )
        .unwrap_err();

        assert!(matches!(err, ReleaseError::MissingRequiredTool { ref tool } if tool == "zig"));
        assert!(cargo.calls.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn test_declined_helper_stops_before_builds() {
        let temp = TempDir::new().unwrap();
        let release = Release {
            plan: plan(temp.path(), &["x86_64-unknown-linux-gnu"]),
            ..Release::default()
        };
        let mut cargo = FakeCargo::new(temp.path());
        let mut out = Vec::new();
        let mut prompt = crate::install::LinePrompt::new("n\n".as_bytes(), Vec::new());

        let err = run_release(
            &release,
            &Tools(vec!["cargo", "zig"]),
            &mut prompt,
            &mut cargo,
            &mut out,
        )
        .unwrap_err();

        assert!(matches!(err, ReleaseError::DeclinedInstallation { .. }));
        assert!(cargo.calls.is_empty());
    }

    #[test]
    fn test_accepted_helper_installs_then_builds() {
        let temp = TempDir::new().unwrap();
        let release = Release {
            plan: plan(temp.path(), &["x86_64-unknown-linux-gnu"]),
            ..Release::default()
        };
        let mut cargo = FakeCargo::new(temp.path());
        let mut out = Vec::new();

        run_release(
            &release,
            &Tools(vec!["cargo", "zig"]),
            &mut FixedConsent(ConsentDecision::Accepted),
            &mut cargo,
            &mut out,
        )
        .unwrap();

        assert_eq!(cargo.calls[0], release.helper.install_command);
        assert_eq!(cargo.built_triples(), ["x86_64-unknown-linux-gnu"]);
        assert!(output(out).starts_with("Installed cargo-zigbuild\n"));
    }

    #[test]
    fn test_first_build_failure_reports_nothing_built() {
        let temp = TempDir::new().unwrap();
        let triples = ["x86_64-pc-windows-gnu", "x86_64-unknown-linux-gnu"];
        let mut cargo = FakeCargo::new(temp.path());
        cargo.failing.push("x86_64-pc-windows-gnu");
        let mut out = Vec::new();

        let err = build_targets(&plan(temp.path(), &triples), &mut cargo, &mut out).unwrap_err();

        assert_ne!(err.exit_code(), 0);
        let out = output(out);
        assert_eq!(out.matches("Building for").count(), 1);
        assert!(!out.contains("[ Built ]"));
    }
}
