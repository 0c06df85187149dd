//! Source fetching.
//!
//! The installer talks to transports only through `Downloader`. The local
//! implementation handles `path` sources; remote transports plug in behind the
//! same trait.

use std::path::{Path, PathBuf};

use pod_core::types::SourceReference;
use thiserror::Error;

pub mod extract;
pub mod local;

pub use extract::extract_tarball;
pub use local::LocalDownloader;

/// Error returned by a downloader; the installer attaches package context
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a downloader call
pub type FetchResult = Result<(), FetchError>;

/// Fetches a package source tree into a destination directory
pub trait Downloader: Send + Sync {
    /// Place the source described by `source` at `destination`
    fn fetch(&self, source: &SourceReference, destination: &Path) -> FetchResult;

    /// Remove version-control metadata from a fetched tree
    fn clean(&self, destination: &Path) -> FetchResult;
}

/// Failures specific to a transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("no {scheme} transport is configured (source {location})")]
    Unsupported { scheme: &'static str, location: String },

    #[error("local source does not exist: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("local source is neither a directory nor a .tar.gz archive: {}", .path.display())]
    UnsupportedArchive { path: PathBuf },

    #[error("archive entry escapes the destination: {entry}")]
    UnsafeEntry { entry: String },
}
