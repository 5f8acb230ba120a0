use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use release_builder::config::{assume_yes_from_env, load_release, ASSUME_YES_ENV};
use release_builder::install::{ConsentDecision, ConsentPrompt, FixedConsent, LinePrompt};
use release_builder::locate::locate_binary;
use release_builder::preflight::{check_required_tools, PathResolver, REQUIRED_TOOLS};
use release_builder::process::SystemRunner;
use release_builder::{run_release, Release, ReleaseError};

struct GlobalOptions {
    config: Option<PathBuf>,
    assume_yes: bool,
}

fn usage() -> &'static str {
    "Usage:\n  release-builder [--config <path>] [--yes] [build-all]\n  release-builder [--config <path>] [--yes] build <triple>\n  release-builder [--config <path>] locate <triple>\n  release-builder [--config <path>] targets"
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("[ Fatal Error] {err:#}");
            let code = err
                .downcast_ref::<ReleaseError>()
                .map_or(1, ReleaseError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    let (options, command) = split_global_options(args)?;
    if is_build_invocation(command) {
        check_required_tools(&PathResolver, REQUIRED_TOOLS)?;
    }

    let cwd = std::env::current_dir().context("resolving current directory")?;
    let release = load_release(&cwd, options.config.as_deref())?;

    match command {
        [] => build(&release, &options),
        [build_all] if build_all == "build-all" => build(&release, &options),
        [build_cmd, triple] if build_cmd == "build" => {
            let mut release = release;
            release.plan.targets = release.plan.targets.only(triple)?;
            build(&release, &options)
        }
        [locate, triple] if locate == "locate" => locate_one(&release, triple),
        [targets] if targets == "targets" => {
            list_targets(&release);
            Ok(())
        }
        _ => bail!(usage()),
    }
}

/// Build runs check host tools before reading any configuration.
fn is_build_invocation(command: &[String]) -> bool {
    match command {
        [] => true,
        [cmd] => cmd == "build-all",
        [cmd, _] => cmd == "build",
        _ => false,
    }
}

fn split_global_options(args: &[String]) -> Result<(GlobalOptions, &[String])> {
    let mut options = GlobalOptions {
        config: None,
        assume_yes: assume_yes_from_env(std::env::var(ASSUME_YES_ENV).ok().as_deref()),
    };

    let mut rest = args;
    loop {
        match rest {
            [flag, path, tail @ ..] if flag == "--config" => {
                options.config = Some(PathBuf::from(path));
                rest = tail;
            }
            [flag] if flag == "--config" => bail!("--config requires a path\n{}", usage()),
            [flag, tail @ ..] if flag == "--yes" || flag == "-y" => {
                options.assume_yes = true;
                rest = tail;
            }
            _ => return Ok((options, rest)),
        }
    }
}

fn build(release: &Release, options: &GlobalOptions) -> Result<()> {
    let mut prompt: Box<dyn ConsentPrompt> = if options.assume_yes {
        Box::new(FixedConsent(ConsentDecision::Accepted))
    } else {
        Box::new(LinePrompt::stdio())
    };

    run_release(
        release,
        &PathResolver,
        &mut *prompt,
        &mut SystemRunner,
        &mut std::io::stdout(),
    )?;
    Ok(())
}

fn locate_one(release: &Release, triple: &str) -> Result<()> {
    let triple = release.plan.targets.lookup(triple)?;
    let path = locate_binary(&release.plan.target_dir, &triple, &release.plan.project)
        .with_context(|| {
            format!(
                "locating '{}' under '{}'",
                release.plan.project,
                release.plan.target_dir.display()
            )
        })?;
    println!("{}", path.display());
    Ok(())
}

fn list_targets(release: &Release) {
    for (triple, enabled) in release.plan.targets.entries() {
        let marker = if enabled { "enabled" } else { "disabled" };
        println!("{triple} ({marker})");
    }
}
