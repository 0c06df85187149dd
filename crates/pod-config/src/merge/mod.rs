//! Settings layering: global file, project manifest, environment, CLI flags

use std::collections::HashMap;
use camino::{Utf8Path, Utf8PathBuf};
use pod_core::error::PodError;
use crate::settings::{parse_settings, pod_home, InstallSettings, SettingsLayer};
use crate::ConfigResult;

/// File name of the root manifest
pub const MANIFEST_FILE: &str = "pod.toml";

/// Prefix of recognized environment variables
pub const ENV_PREFIX: &str = "POD_";

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
}

/// Configuration layering and merging
#[derive(Debug, Default)]
pub struct ConfigLayering {
    /// Global configuration
    global: Option<SettingsLayer>,
    /// Project configuration
    project: Option<SettingsLayer>,
    /// Environment overrides
    env_overrides: HashMap<String, String>,
    /// CLI flag overrides
    cli_overrides: HashMap<String, String>,
}

/// Where a project's settings were found
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Global config file
    Global(Utf8PathBuf),
    /// Project pod.toml file
    ProjectManifest(Utf8PathBuf),
    /// Environment variable
    Environment(String),
    /// CLI flag
    CommandLine,
}

/// Settings plus the manifest they belong to
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub settings: InstallSettings,
    pub manifest_path: Utf8PathBuf,
    pub project_dir: Utf8PathBuf,
    /// Layers that contributed, lowest priority first
    pub sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd }
    }

    /// Find the project manifest and build the effective settings
    pub async fn load(&self, cli_overrides: HashMap<String, String>) -> ConfigResult<LoadedConfig> {
        let manifest_path = self.resolve_config_path(MANIFEST_FILE)?;
        if !manifest_path.exists() {
            return Err(PodError::FileNotFound {
                path: manifest_path.into_std_path_buf(),
            });
        }
        let project_dir = manifest_path
            .parent()
            .map(Utf8Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone());

        let mut sources = Vec::new();
        let global = match self.load_global_settings().await? {
            Some((layer, path)) => {
                sources.push(ConfigSource::Global(path));
                Some(layer)
            }
            None => None,
        };
        let project = load_settings_file(&manifest_path).await?;
        sources.push(ConfigSource::ProjectManifest(manifest_path.clone()));

        let env_overrides = ConfigLayering::collect_env_overrides();
        sources.extend(env_overrides.keys().cloned().map(ConfigSource::Environment));
        if !cli_overrides.is_empty() {
            sources.push(ConfigSource::CommandLine);
        }

        let layering = ConfigLayering {
            global,
            project: Some(project),
            env_overrides,
            cli_overrides,
        };
        let settings = layering.merge(&project_dir, &self.cwd)?;

        Ok(LoadedConfig {
            settings,
            manifest_path,
            project_dir,
            sources,
        })
    }

    /// Find configuration file in project (walks up directory tree)
    pub fn resolve_config_path(&self, filename: &str) -> ConfigResult<Utf8PathBuf> {
        let mut current = self.cwd.as_path();

        loop {
            let config_path = current.join(filename);
            if config_path.exists() {
                return Ok(config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        // Not found anywhere; report the path in the current directory
        Ok(self.cwd.join(filename))
    }

    /// Load `~/.pod/config.toml` if it exists
    pub async fn load_global_settings(&self) -> ConfigResult<Option<(SettingsLayer, Utf8PathBuf)>> {
        let home = pod_home().ok_or_else(|| PodError::ConfigValidation {
            field: "home_dir".to_string(),
            reason: "Could not determine home directory".to_string(),
        })?;
        let global_config_path = home.join("config.toml");

        if global_config_path.exists() {
            let layer = load_settings_file(&global_config_path).await?;
            Ok(Some((layer, global_config_path)))
        } else {
            Ok(None)
        }
    }
}

/// Read the `[settings]` table of a file
pub async fn load_settings_file(path: &Utf8Path) -> ConfigResult<SettingsLayer> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PodError::io("Failed to read settings", path.as_std_path(), e))?;
    parse_settings(&content, path)
}

impl ConfigLayering {
    /// Create an empty layering
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global(mut self, layer: SettingsLayer) -> Self {
        self.global = Some(layer);
        self
    }

    pub fn with_project(mut self, layer: SettingsLayer) -> Self {
        self.project = Some(layer);
        self
    }

    pub fn with_env(mut self, overrides: HashMap<String, String>) -> Self {
        self.env_overrides = overrides;
        self
    }

    pub fn with_cli(mut self, overrides: HashMap<String, String>) -> Self {
        self.cli_overrides = overrides;
        self
    }

    /// Merge all layers over the defaults.
    ///
    /// File paths resolve against the project directory; environment and CLI
    /// paths resolve against the working directory.
    pub fn merge(&self, project_dir: &Utf8Path, cwd: &Utf8Path) -> ConfigResult<InstallSettings> {
        let mut settings = InstallSettings::defaults(project_dir);

        if let Some(global) = &self.global {
            settings.apply_layer(global, project_dir);
        }
        if let Some(project) = &self.project {
            settings.apply_layer(project, project_dir);
        }

        let env = Self::overrides_to_layer(&self.env_overrides, |key| key.strip_prefix(ENV_PREFIX).map(str::to_lowercase))?;
        settings.apply_layer(&env, cwd);

        // CLI flag overrides (highest priority)
        let cli = Self::overrides_to_layer(&self.cli_overrides, |key| Some(key.to_string()))?;
        settings.apply_layer(&cli, cwd);

        settings.validate()?;
        Ok(settings)
    }

    fn overrides_to_layer(
        overrides: &HashMap<String, String>,
        field_name: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<SettingsLayer> {
        let mut layer = SettingsLayer::default();

        for (key, value) in overrides {
            let Some(field) = field_name(key) else { continue };
            match field.as_str() {
                "build_root" => layer.build_root = Some(Utf8PathBuf::from(value)),
                "spec_repo" => layer.spec_repo = Some(Utf8PathBuf::from(value)),
                "clean" => layer.clean = Some(parse_bool(key, value)?),
                "jobs" => {
                    let jobs = value.parse().map_err(|e| PodError::ConfigValidation {
                        field: key.clone(),
                        reason: format!("Invalid job count '{}': {}", value, e),
                    })?;
                    layer.jobs = Some(jobs);
                }
                _ => {
                    // Unknown override, ignore
                }
            }
        }

        Ok(layer)
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect()
    }
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(PodError::ConfigValidation {
            field: key.to_string(),
            reason: format!("expected a boolean, got '{}'", value),
        }),
    }
}
