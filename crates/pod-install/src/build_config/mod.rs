//! Aggregate build configuration.
//!
//! Fragments from every installed specification are merged into one mapping
//! and written as `KEY = value` lines.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use pod_core::error::PodError;

use crate::InstallResult;

/// File name of the generated configuration inside the build root
pub const XCCONFIG_FILE: &str = "Pods.xcconfig";

/// Settings every aggregate starts with
pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    // headers of the static library land in the products directory
    ("USER_HEADER_SEARCH_PATHS", "$(BUILT_PRODUCTS_DIR)"),
    ("ALWAYS_SEARCH_USER_PATHS", "YES"),
];

/// Merged build settings in insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    values: IndexMap<String, String>,
}

impl BuildSettings {
    /// Aggregate seeded with the default settings
    pub fn new() -> Self {
        Self {
            values: DEFAULT_SETTINGS
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }

    /// Aggregate with no settings at all
    pub fn empty() -> Self {
        Self {
            values: IndexMap::new(),
        }
    }

    /// Merge one fragment; an existing value gets the new one appended after a space
    pub fn merge(&mut self, fragment: &BTreeMap<String, String>) {
        for (key, value) in fragment {
            match self.values.get_mut(key) {
                Some(existing) => {
                    existing.push(' ');
                    existing.push_str(value);
                }
                None => {
                    self.values.insert(key.clone(), value.clone());
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Write the rendered settings to `path`
    pub fn write(&self, path: &Path) -> InstallResult<()> {
        std::fs::write(path, self.to_string())
            .map_err(|e| PodError::io("Failed to write build configuration", path, e))
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BuildSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.values {
            writeln!(f, "{} = {}", key, value)?;
        }
        Ok(())
    }
}
