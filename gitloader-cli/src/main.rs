//! Git Loader — push a local folder into a git remote, or clone one.
//!
//! # Usage
//!
//! ```text
//! gitloader push <source> --remote <url> (--token <token> | --token-stdin) [--mode update|replace] [--json]
//! gitloader clone <url> <destination> [--token <token>] [--json]
//!
//! global: [--git <path>] [--scratch-dir <dir>] [--fixed-scratch] [--verbose]
//! ```

mod commands;
mod output;

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use commands::{clone::CloneArgs, push::PushArgs};
use gitloader_core::SyncMode;
use gitloader_sync::{EngineConfig, StagingLayout};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "gitloader",
    version,
    about = "Push a local folder into a git repository, or clone one",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Commit and push the contents of a local folder to a remote.
    Push(PushArgs),

    /// Clone a remote repository into a local directory.
    Clone(CloneArgs),
}

/// Engine settings shared by every subcommand.
#[derive(Args, Debug)]
struct GlobalArgs {
    /// git executable to run.
    #[arg(long, global = true, default_value = "git")]
    git: PathBuf,

    /// Directory that holds scratch checkouts (default: system temp dir).
    #[arg(long, global = true)]
    scratch_dir: Option<PathBuf>,

    /// Use one fixed scratch directory; concurrent pushes wait for each other.
    #[arg(long, global = true)]
    fixed_scratch: bool,

    /// Log engine internals to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
}

impl GlobalArgs {
    fn engine_config(&self) -> Result<EngineConfig> {
        let staging = match (&self.scratch_dir, self.fixed_scratch) {
            (Some(dir), true) => StagingLayout::fixed_in(dir),
            (None, true) => {
                let cwd = std::env::current_dir().context("could not determine working directory")?;
                StagingLayout::fixed_in(&cwd)
            }
            (Some(dir), false) => StagingLayout::unique_in(dir),
            (None, false) => StagingLayout::default(),
        };
        Ok(EngineConfig {
            git_program: self.git.clone(),
            staging,
            ..EngineConfig::default()
        })
    }
}

// ---------------------------------------------------------------------------
// SyncMode argument
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `SyncMode` from CLI args.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeArg(pub SyncMode);

impl FromStr for ModeArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "update" => Ok(Self(SyncMode::Update)),
            "replace" => Ok(Self(SyncMode::Replace)),
            other => Err(format!(
                "unknown mode '{other}'; expected: update, replace"
            )),
        }
    }
}

impl fmt::Display for ModeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ModeArg> for SyncMode {
    fn from(m: ModeArg) -> Self {
        m.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    let config = cli.global.engine_config()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async move {
        match cli.command {
            Commands::Push(args) => args.run(config).await,
            Commands::Clone(args) => args.run(config).await,
        }
    })
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
