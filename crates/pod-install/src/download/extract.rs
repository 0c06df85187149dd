//! Tarball extraction with path validation

use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tar::Archive;

use super::{FetchError, TransportError};

/// Extract a gzipped tarball into `dest_dir`.
///
/// Entries that would land outside `dest_dir` abort the extraction.
pub fn extract_tarball<R: Read>(reader: R, dest_dir: &Path) -> Result<usize, FetchError> {
    let mut archive = Archive::new(GzDecoder::new(reader));
    fs::create_dir_all(dest_dir)?;

    let mut files = 0;
    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.into_owned();
        let safe_path = validate_extract_path(&entry_path, dest_dir)?;

        match entry.header().entry_type() {
            tar::EntryType::Regular => {
                if let Some(parent) = safe_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut file = fs::File::create(&safe_path)?;
                std::io::copy(&mut entry, &mut file)?;
                files += 1;
            }
            tar::EntryType::Directory => {
                fs::create_dir_all(&safe_path)?;
            }
            // links and device entries are not part of a source tree
            _ => continue,
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(mode) = entry.header().mode() {
                let _ = fs::set_permissions(&safe_path, fs::Permissions::from_mode(mode));
            }
        }
    }

    Ok(files)
}

/// Map an archive entry path into `dest_dir`, rejecting traversal
fn validate_extract_path(entry_path: &Path, dest_dir: &Path) -> Result<PathBuf, TransportError> {
    let mut safe_path = dest_dir.to_path_buf();

    for component in entry_path.components() {
        match component {
            Component::Normal(name) => safe_path.push(name),
            Component::CurDir => continue,
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(TransportError::UnsafeEntry {
                    entry: entry_path.display().to_string(),
                });
            }
        }
    }

    Ok(safe_path)
}
