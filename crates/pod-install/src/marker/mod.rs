//! Completion markers.
//!
//! A destination directory counts as installed only when it carries a marker
//! written after a successful fetch. The marker records a fingerprint of the
//! source it was fetched from, so a changed source invalidates it.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use pod_core::error::PodError;
use pod_core::types::Specification;
use pod_core::utils::source_fingerprint;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::InstallResult;

/// File name of the marker inside a destination directory
pub const MARKER_FILE: &str = ".pod-complete";

/// Contents of a completion marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMarker {
    pub name: String,
    pub version: String,
    /// Display form of the source reference
    pub source: String,
    pub installed_at: DateTime<Utc>,
    /// Blake3 fingerprint of the source reference
    pub fingerprint: String,
}

/// What a destination directory holds before fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationState {
    /// Nothing on disk
    Missing,
    /// Directory without a marker, left by an interrupted fetch
    Partial,
    /// Marker for a different source
    Stale,
    /// Marker matches the owner's current source
    Complete,
}

impl CompletionMarker {
    /// Marker describing `owner` as fetched now
    pub fn for_specification(owner: &Specification) -> Self {
        let (name, version) = owner
            .identity()
            .map(|(name, version)| (name.to_string(), version.to_string()))
            .unwrap_or_default();

        Self {
            name,
            version,
            source: owner
                .source()
                .map(|source| source.to_string())
                .unwrap_or_default(),
            installed_at: Utc::now(),
            fingerprint: source_fingerprint(owner.source()),
        }
    }

    /// Read the marker in `destination`; unreadable markers count as absent
    pub fn read(destination: &Path) -> Option<Self> {
        let path = destination.join(MARKER_FILE);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(marker) => Some(marker),
            Err(e) => {
                warn!("Ignoring corrupt marker {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write this marker into `destination`
    pub fn write(&self, destination: &Path) -> InstallResult<()> {
        let path = destination.join(MARKER_FILE);
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            PodError::io(
                format!("Failed to serialize completion marker: {}", e),
                &path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
            )
        })?;
        fs::write(&path, content).map_err(|e| PodError::io("Failed to write completion marker", &path, e))
    }

    /// Check that this marker was written for `owner`'s current source
    pub fn matches(&self, owner: &Specification) -> bool {
        let identity_matches = owner
            .identity()
            .is_some_and(|(name, version)| self.name == name && self.version == version.to_string());
        identity_matches && self.fingerprint == source_fingerprint(owner.source())
    }
}

/// Classify `destination` for `owner`
pub fn inspect_destination(destination: &Path, owner: &Specification) -> DestinationState {
    if !destination.exists() {
        return DestinationState::Missing;
    }
    match CompletionMarker::read(destination) {
        Some(marker) if marker.matches(owner) => DestinationState::Complete,
        Some(_) => DestinationState::Stale,
        None => DestinationState::Partial,
    }
}
