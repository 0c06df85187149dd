//! Path utilities for safe file system operations.
//!
//! Provides path normalization and traversal checks.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by resolving . and .. components lexically
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            other => components.push(other),
        }
    }

    components.iter().collect()
}

/// Check if a relative path stays inside its base directory
pub fn is_safe_path(path: &Path) -> bool {
    if path.is_absolute() {
        return false;
    }

    let mut depth = 0i32;

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            Component::Normal(_) => {
                depth += 1;
            }
            _ => {
                return false;
            }
        }
    }

    true
}

/// Get the file extension as a lowercase string
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        let path = Path::new("./src/../lib/./file.rs");
        assert_eq!(normalize_path(path), Path::new("lib/file.rs"));

        let absolute = Path::new("/specs/Zip/../vendor/zip");
        assert_eq!(normalize_path(absolute), Path::new("/specs/vendor/zip"));

        assert_eq!(normalize_path(Path::new("../up")), Path::new("../up"));
    }

    #[test]
    fn test_is_safe_path() {
        assert!(is_safe_path(Path::new("src/lib.rs")));
        assert!(is_safe_path(Path::new("./src/lib.rs")));
        assert!(!is_safe_path(Path::new("../../../etc/passwd")));
        assert!(!is_safe_path(Path::new("/absolute/path")));
    }

    #[test]
    fn test_get_extension() {
        assert_eq!(get_extension(Path::new("Zip.m")), Some("m".to_string()));
        assert_eq!(get_extension(Path::new("zip.tar.GZ")), Some("gz".to_string()));
        assert_eq!(get_extension(Path::new("Makefile")), None);
    }
}
