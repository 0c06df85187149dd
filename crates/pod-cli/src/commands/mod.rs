//! Command implementations and dispatch logic.
//!
//! Each command is an async function taking the parsed arguments and a
//! `CommandContext`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use camino::Utf8PathBuf;
use pod_config::{parse_root_manifest, ConfigLoader, LoadedConfig};
use pod_core::error::{PodError, PodResult};
use pod_core::types::Specification;
use pod_resolver::{Resolution, Resolver, SpecRepository};
use tracing::debug;

pub mod install;
pub mod resolve;
pub mod spec;


use crate::output::OutputHandler;
use crate::Commands;

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: PathBuf,
    pub output: OutputHandler,
}

impl CommandContext {
    pub fn new() -> PodResult<Self> {
        let cwd = std::env::current_dir().map_err(|e| PodError::io("Failed to get current directory", ".", e))?;

        Ok(Self {
            cwd,
            output: OutputHandler::new(),
        })
    }

    pub fn cwd_utf8(&self) -> PodResult<Utf8PathBuf> {
        Utf8PathBuf::from_path_buf(self.cwd.clone()).map_err(|path| PodError::ConfigValidation {
            field: "cwd".to_string(),
            reason: format!("{} is not valid UTF-8", path.display()),
        })
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> PodResult<()> {
    match command {
        Commands::Install(args) => {
            debug!("Installing (clean: {}, jobs: {:?})", args.clean, args.jobs);
            install::execute(args, ctx).await.map(|_| ())
        }
        Commands::Resolve { spec_repo } => resolve::execute(spec_repo, ctx).await,
        Commands::Spec { file } => spec::execute(file, ctx).await.map(|_| ()),
        Commands::Version => show_version(ctx),
    }
}

/// Effective settings and the parsed root manifest
pub struct Project {
    pub config: LoadedConfig,
    pub root: Specification,
}

impl Project {
    /// Locate `pod.toml` from the working directory and apply every settings layer
    pub async fn load(ctx: &CommandContext, cli_overrides: HashMap<String, String>) -> PodResult<Self> {
        let config = ConfigLoader::new(ctx.cwd_utf8()?).load(cli_overrides).await?;
        debug!("Settings from {:?}", config.sources);

        let root = parse_root_manifest(config.manifest_path.as_std_path())?;
        Ok(Self { config, root })
    }

    /// Resolve the root manifest against the configured specification repository
    pub fn resolve(&self) -> PodResult<Resolution> {
        let repository = SpecRepository::new(self.config.settings.spec_repo.clone().into_std_path_buf());
        Resolver::new(Arc::new(repository)).resolve(&self.root)
    }
}

/// Insert a path override; relative paths are kept for the settings layer to resolve
fn insert_path(overrides: &mut HashMap<String, String>, key: &str, path: Option<&PathBuf>) {
    if let Some(path) = path {
        overrides.insert(key.to_string(), path.display().to_string());
    }
}

fn show_version(ctx: &CommandContext) -> PodResult<()> {
    let target = format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS);

    ctx.output.info(&format!("pod {}", env!("CARGO_PKG_VERSION")));
    ctx.output.detail(&format!("Built: {}", env!("POD_BUILD_DATE")));
    ctx.output.detail(&format!("Target: {}", target));
    ctx.output.detail(&format!("Rust: {}", env!("POD_RUSTC_VERSION")));
    Ok(())
}
