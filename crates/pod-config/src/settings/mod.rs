//! Install settings.
//!
//! Settings come from the `[settings]` table of `pod.toml` or from the global
//! `~/.pod/config.toml`; every field is optional in a file so layers can be
//! stacked without clobbering each other.

use camino::{Utf8Path, Utf8PathBuf};
use pod_core::error::PodError;
use serde::{Deserialize, Serialize};

use crate::ConfigResult;

/// Default build root, relative to the project directory
pub const DEFAULT_BUILD_ROOT: &str = "Pods";

/// Fully resolved settings for one install
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallSettings {
    /// Directory that receives package sources and generated files
    pub build_root: Utf8PathBuf,
    /// Local specification repository
    pub spec_repo: Utf8PathBuf,
    /// Remove version-control metadata after each download
    pub clean: bool,
    /// Concurrent downloads
    pub jobs: usize,
}

/// One layer of settings as written in a file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_root: Option<Utf8PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_repo: Option<Utf8PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

/// Settings file shape: the global config or a root manifest
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    settings: Option<SettingsLayer>,
}

impl InstallSettings {
    /// Defaults for a project rooted at `project_dir`
    pub fn defaults(project_dir: &Utf8Path) -> Self {
        Self {
            build_root: project_dir.join(DEFAULT_BUILD_ROOT),
            spec_repo: default_spec_repo().unwrap_or_else(|| project_dir.join(".pod").join("specs")),
            clean: false,
            jobs: 1,
        }
    }

    /// Overlay the fields set in `layer`; relative paths resolve against `base`
    pub fn apply_layer(&mut self, layer: &SettingsLayer, base: &Utf8Path) {
        if let Some(build_root) = &layer.build_root {
            self.build_root = absolutize(build_root, base);
        }
        if let Some(spec_repo) = &layer.spec_repo {
            self.spec_repo = absolutize(spec_repo, base);
        }
        if let Some(clean) = layer.clean {
            self.clean = clean;
        }
        if let Some(jobs) = layer.jobs {
            self.jobs = jobs;
        }
    }

    /// Check field values after all layers are applied
    pub fn validate(&self) -> ConfigResult<()> {
        if self.jobs == 0 {
            return Err(PodError::ConfigValidation {
                field: "jobs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.build_root.as_str().is_empty() {
            return Err(PodError::ConfigValidation {
                field: "build_root".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// `~/.pod/specs`
pub fn default_spec_repo() -> Option<Utf8PathBuf> {
    pod_home().map(|home| home.join("specs"))
}

/// `~/.pod`
pub fn pod_home() -> Option<Utf8PathBuf> {
    let home = dirs::home_dir()?;
    Utf8PathBuf::try_from(home).ok().map(|home| home.join(".pod"))
}

/// Parse the `[settings]` table out of a settings file.
///
/// Other tables are ignored so a root manifest can be read directly.
pub fn parse_settings(content: &str, path: &Utf8Path) -> ConfigResult<SettingsLayer> {
    let file: SettingsFile = toml::from_str(content)
        .map_err(|e| PodError::parse(path.as_std_path(), format!("invalid settings: {}", e)))?;
    Ok(file.settings.unwrap_or_default())
}

fn absolutize(path: &Utf8Path, base: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
