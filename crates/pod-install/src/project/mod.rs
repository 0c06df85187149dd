//! Project writers consume the collected source files.

use std::path::{Path, PathBuf};

use pod_core::error::PodError;
use serde::{Deserialize, Serialize};

use crate::InstallResult;

/// File written by `SourceListWriter` inside the output root
pub const SOURCE_LIST_FILE: &str = "Pods.sources.json";

/// Produces a build or project artifact from source paths
pub trait ProjectWriter: Send + Sync {
    /// `source_files` are relative to `output_root`
    fn create_project(&self, source_files: &[PathBuf], output_root: &Path) -> InstallResult<()>;
}

/// Writes the source list as JSON
#[derive(Debug, Default, Clone)]
pub struct SourceListWriter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceList {
    pub generated_by: String,
    pub source_files: Vec<PathBuf>,
}

impl SourceListWriter {
    pub fn new() -> Self {
        Self
    }

    /// Read back a list written earlier
    pub fn read(output_root: &Path) -> InstallResult<SourceList> {
        let path = output_root.join(SOURCE_LIST_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| PodError::io("Failed to read source list", &path, e))?;
        serde_json::from_str(&content).map_err(|e| PodError::parse(&path, e.to_string()))
    }
}

impl ProjectWriter for SourceListWriter {
    fn create_project(&self, source_files: &[PathBuf], output_root: &Path) -> InstallResult<()> {
        let path = output_root.join(SOURCE_LIST_FILE);
        let list = SourceList {
            generated_by: format!("pod {}", env!("CARGO_PKG_VERSION")),
            source_files: source_files.to_vec(),
        };
        let content = serde_json::to_string_pretty(&list).map_err(|e| {
            PodError::io(
                format!("Failed to serialize source list: {}", e),
                &path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
            )
        })?;
        std::fs::write(&path, content).map_err(|e| PodError::io("Failed to write source list", &path, e))
    }
}
