//! # pod-cli
//!
//! Entry point of the `pod` binary. Parses the command line, sets up logging
//! and hands off to the command handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use pod_core::error::PodError;
use tracing::{debug, error};

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Resolve and install source packages into a build tree
#[derive(Parser)]
#[command(name = "pod", version, about = "Resolve and install source packages")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve pod.toml and install every package into the build root
    Install(InstallArgs),
    /// Print the resolved package closure without installing
    Resolve {
        /// Specification repository to resolve against
        #[arg(long, value_name = "DIR")]
        spec_repo: Option<PathBuf>,
    },
    /// Parse and validate a package definition file
    Spec {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Show version information
    Version,
}

#[derive(Args, Debug, Default, Clone)]
pub struct InstallArgs {
    /// Strip version-control metadata from downloaded sources
    #[arg(long)]
    pub clean: bool,
    /// Number of concurrent downloads
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,
    /// Directory receiving sources and generated files
    #[arg(long, value_name = "DIR")]
    pub build_root: Option<PathBuf>,
    /// Specification repository to resolve against
    #[arg(long, value_name = "DIR")]
    pub spec_repo: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    debug!("Starting pod v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", ErrorFormatter::new().format_error(&e));
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> Result<(), PodError> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| PodError::io("Failed to create async runtime", ".", e))?;

    rt.block_on(async {
        let ctx = CommandContext::new()?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "pod={level},pod_config={level},pod_resolver={level},pod_install={level}"
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("pod encountered an unexpected error: {}", panic_info);
        eprintln!("pod crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/pod-build/pod/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
