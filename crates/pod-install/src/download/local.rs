//! Downloader for sources on the local file system

use std::fs;
use std::path::{Path, PathBuf};

use pod_core::types::SourceReference;
use pod_core::utils::get_extension;
use tracing::debug;
use walkdir::WalkDir;

use super::{extract_tarball, Downloader, FetchResult, TransportError};

/// Version-control metadata removed by `clean`
pub const VCS_DIRECTORIES: &[&str] = &[".git", ".hg", ".svn"];

/// Copies local directories and extracts local `.tar.gz` archives
#[derive(Debug, Default, Clone)]
pub struct LocalDownloader;

/// Counters from copying a directory tree
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CopyResult {
    pub files_copied: usize,
    pub directories_created: usize,
}

impl LocalDownloader {
    pub fn new() -> Self {
        Self
    }

    /// Copy `source_dir` into `dest_dir` recursively
    pub fn copy_recursive(&self, source_dir: &Path, dest_dir: &Path) -> Result<CopyResult, super::FetchError> {
        let mut result = CopyResult::default();
        fs::create_dir_all(dest_dir)?;

        for entry in WalkDir::new(source_dir) {
            let entry = entry?;
            let relative_path = entry.path().strip_prefix(source_dir)?;
            if relative_path.as_os_str().is_empty() {
                continue;
            }

            let dest_path = dest_dir.join(relative_path);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest_path)?;
                result.directories_created += 1;
            } else if entry.file_type().is_file() {
                if let Some(parent) = dest_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(entry.path(), &dest_path)?;
                result.files_copied += 1;
            }
        }

        Ok(result)
    }
}

fn is_tarball(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    name.ends_with(".tar.gz") || get_extension(path).as_deref() == Some("tgz")
}

impl Downloader for LocalDownloader {
    fn fetch(&self, source: &SourceReference, destination: &Path) -> FetchResult {
        let path = match source {
            SourceReference::Path { path } => path,
            other => {
                return Err(Box::new(TransportError::Unsupported {
                    scheme: other.scheme(),
                    location: other.to_string(),
                }))
            }
        };

        if path.is_dir() {
            let result = self.copy_recursive(path, destination)?;
            debug!("Copied {} file(s) from {}", result.files_copied, path.display());
        } else if path.is_file() && is_tarball(path) {
            let files = extract_tarball(fs::File::open(path)?, destination)?;
            debug!("Extracted {} file(s) from {}", files, path.display());
        } else if path.exists() {
            return Err(Box::new(TransportError::UnsupportedArchive { path: path.clone() }));
        } else {
            return Err(Box::new(TransportError::Missing { path: path.clone() }));
        }

        Ok(())
    }

    fn clean(&self, destination: &Path) -> FetchResult {
        let mut metadata_dirs: Vec<PathBuf> = Vec::new();
        let walker = WalkDir::new(destination).into_iter().filter_entry(|entry| {
            // do not descend into a directory that is about to be removed
            entry.depth() == 0 || !entry.path().parent().is_some_and(is_vcs_dir)
        });

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_dir() && entry.depth() > 0 && is_vcs_dir(entry.path()) {
                metadata_dirs.push(entry.into_path());
            }
        }

        for dir in &metadata_dirs {
            debug!("Removing {}", dir.display());
            fs::remove_dir_all(dir)?;
        }
        Ok(())
    }
}

fn is_vcs_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| VCS_DIRECTORIES.contains(&n))
}
