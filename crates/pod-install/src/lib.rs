//! # pod-install
//!
//! Installs a resolved package closure into a build root.
//!
//! This crate provides:
//! - The `Downloader` boundary and a local-filesystem implementation
//! - Completion markers that make downloads idempotent
//! - Source-file collection and build-configuration merging
//! - The `ProjectWriter` boundary and the `Installer` tying it all together

pub mod build_config;
pub mod download;
pub mod installer;
pub mod marker;
pub mod project;
pub mod sources;

// Re-export main types
pub use build_config::{BuildSettings, XCCONFIG_FILE};
pub use download::{Downloader, FetchError, FetchResult, LocalDownloader, TransportError};
pub use installer::{InstallSummary, Installer};
pub use marker::{inspect_destination, CompletionMarker, DestinationState, MARKER_FILE};
pub use project::{ProjectWriter, SourceListWriter, SOURCE_LIST_FILE};
pub use sources::{collect_source_files, expand_braces, SourceFileList};

use pod_core::error::PodError;

/// Result type for installation operations
pub type InstallResult<T> = Result<T, PodError>;
