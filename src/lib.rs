//! Multi-target release builds through `cargo zigbuild`.
//!
//! One run walks a fixed catalog of target triples and builds the project's
//! release binary for each, strictly in order:
//!
//! - **Preflight** - `cargo` and `zig` must be on `PATH`
//! - **Helper install** - `cargo-zigbuild` is installed on demand, only with
//!   operator consent
//! - **Build loop** - one `cargo zigbuild --release --target <triple>` per
//!   enabled triple; the first failure ends the run
//! - **Artifact lookup** - the produced binary is found among a small set of
//!   platform-specific candidate paths and printed
//!
//! # Architecture
//!
//! ```text
//! bin/release-builder
//!     │
//!     ├── config        release-builder.toml → Release
//!     └── orchestrator  run_release()
//!             │
//!             ├── preflight   check_required_tools()   (ToolResolver)
//!             ├── install     ensure_optional_tool()   (ConsentPrompt, CommandRunner)
//!             └── build loop  build_one() per triple   (CommandRunner)
//!                     └── locate  locate_binary()
//! ```
//!
//! Every collaborator that touches the outside world sits behind a trait, so
//! the whole flow runs in tests without spawning processes.
//!
//! # Example
//!
//! ```rust,no_run
//! use release_builder::install::LinePrompt;
//! use release_builder::preflight::PathResolver;
//! use release_builder::process::SystemRunner;
//! use release_builder::{run_release, Release};
//!
//! let built = run_release(
//!     &Release::default(),
//!     &PathResolver,
//!     &mut LinePrompt::stdio(),
//!     &mut SystemRunner,
//!     &mut std::io::stdout(),
//! )?;
//! println!("{} targets built", built.len());
//! # Ok::<(), release_builder::ReleaseError>(())
//! ```

pub mod config;
pub mod error;
pub mod install;
pub mod locate;
pub mod orchestrator;
pub mod preflight;
pub mod process;
pub mod targets;

pub use error::ReleaseError;
pub use orchestrator::{build_targets, run_release, BuildPlan, BuiltArtifact, Release};
pub use targets::{TargetSet, TargetTriple};
