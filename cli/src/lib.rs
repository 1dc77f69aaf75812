//! `handoff` command line
//!
//! ## Commands
//!
//! - `handoff build --chat <FILE|-> --out <ZIP> [--repo DIR] [--platform-export FILE] [--json]`
//! - `handoff verify <ZIP> [--json]`
//!
//! ## Exit Codes
//!
//! - 0: Success / verification passed
//! - 1: Verification failed
//! - 3: Infrastructure error (unreadable input, unwritable archive, bad config)

mod build_cmd;
mod verify_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub use build_cmd::BuildArgs;
pub use verify_cmd::VerifyArgs;

pub const EXIT_OK: i32 = 0;
pub const EXIT_VERIFY_FAILED: i32 = 1;
pub const EXIT_INFRASTRUCTURE: i32 = 3;

/// Build and verify handoff packs
#[derive(Debug, Parser)]
#[command(name = "handoff", version)]
pub struct HandoffCli {
    /// Config file (defaults to $HANDOFF_CONFIG, then ~/.config/handoff/handoff.toml)
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log progress at info level (RUST_LOG overrides)
    #[arg(long = "verbose", short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: HandoffSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum HandoffSubcommand {
    /// Assemble a handoff pack zip from a chat transcript
    Build(BuildArgs),

    /// Check every message digest in a handoff pack
    Verify(VerifyArgs),
}

/// Log to stderr so stdout stays parseable.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Run a parsed command line and return the process exit code.
pub fn run(cli: HandoffCli) -> anyhow::Result<i32> {
    match cli.command {
        HandoffSubcommand::Build(args) => build_cmd::run_build(cli.config.as_deref(), args),
        HandoffSubcommand::Verify(args) => verify_cmd::run_verify(args),
    }
}
