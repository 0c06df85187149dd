//! Error types and result aliases for pod operations.
//!
//! Provides a unified error type covering parsing, resolution and installation,
//! with messages that name the package and file involved.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unified error type for all pod operations
#[derive(Error, Debug)]
pub enum PodError {
    // Parsing errors
    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    // Resolution errors
    #[error(
        "No specification found for package '{name}'{}",
        .required_by.as_ref().map(|origin| format!(" (required by {})", origin)).unwrap_or_default()
    )]
    PackageNotFound {
        name: String,
        /// Declaring specification and its definition file, when known
        required_by: Option<String>,
    },

    #[error("No version of '{package}' satisfies {constraints} (available: {available})")]
    UnsatisfiableConstraint {
        package: String,
        constraints: String,
        available: String,
    },

    #[error("Package '{package}' is part of itself: {chain}")]
    PartOfCycle { package: String, chain: String },

    // Installation errors
    #[error("Failed to download {package} {version} into {}: {message}", .destination.display())]
    Download {
        package: String,
        version: String,
        destination: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // IO errors
    #[error("{message}: {}", .path.display())]
    FileSystem {
        message: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for pod operations
pub type PodResult<T> = Result<T, PodError>;

impl PodError {
    /// Create a file system error for the given path
    pub fn io(message: impl Into<String>, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a parse error for the given definition file
    pub fn parse(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Check if this error is recoverable by retrying
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PodError::Download { .. } | PodError::FileSystem { .. })
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            PodError::FileNotFound { .. } => {
                Some("Run from a directory containing pod.toml or pass the file path explicitly")
            }
            PodError::PackageNotFound { .. } => {
                Some("Check the package name spelling or point --spec-repo at the right repository")
            }
            PodError::UnsatisfiableConstraint { .. } => {
                Some("Relax one of the listed version requirements so they overlap")
            }
            PodError::PartOfCycle { .. } => {
                Some("A part_of chain must end at a package that owns its source")
            }
            PodError::Download { .. } => {
                Some("Fix the source and run the install again; packages already fetched are kept")
            }
            _ => None,
        }
    }
}
