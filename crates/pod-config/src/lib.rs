//! Configuration parsing for pod
//!
//! This crate turns package-definition files and the project's `pod.toml`
//! into `Specification`s and computes the effective install settings from
//! the global config, the project manifest, environment and CLI flags.

pub mod definition;
pub mod merge;
pub mod settings;

// Re-export main types
pub use definition::{
    parse_definition_str, parse_package_definition, parse_root_manifest, Declaration, DefinitionKind,
};
pub use merge::{ConfigLayering, ConfigLoader, ConfigSource, LoadedConfig, MANIFEST_FILE};
pub use settings::{InstallSettings, SettingsLayer};

use pod_core::error::PodError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, PodError>;

/// File-name suffix of package definitions in a spec repository
pub const DEFINITION_SUFFIX: &str = ".podspec.toml";

/// File name of the definition for package `name`
pub fn definition_file_name(name: &str) -> String {
    format!("{}{}", name, DEFINITION_SUFFIX)
}
