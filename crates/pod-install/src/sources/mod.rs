//! Source-file collection.
//!
//! Patterns are resolved against the owner's destination directory. A pattern
//! naming a directory stands for the recognized source files directly inside
//! it. Brace alternatives are expanded before globbing since `glob` has no
//! brace support. Matches are recorded relative to the build root.

use std::path::{Path, PathBuf};

use glob::MatchOptions;
use indexmap::IndexSet;
use pod_core::error::PodError;
use pod_core::types::Specification;
use pod_core::utils::is_safe_path;
use tracing::debug;

use crate::InstallResult;

/// Wildcards never match a leading dot, so `*` skips hidden entries
const HIDDEN_FILES_EXCLUDED: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

/// Pattern applied inside a directory named by `source_files`
pub const DEFAULT_SOURCE_PATTERN: &str = "*.{h,m,mm,c,cpp}";

/// Ordered, duplicate-free list of source files relative to the build root
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceFileList {
    files: IndexSet<PathBuf>,
}

impl SourceFileList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a path; returns false if it was already listed
    pub fn push(&mut self, path: PathBuf) -> bool {
        self.files.insert(path)
    }

    /// Append paths in order; returns how many were new
    pub fn extend(&mut self, paths: impl IntoIterator<Item = PathBuf>) -> usize {
        let mut added = 0;
        for path in paths {
            if self.push(path) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter()
    }

    pub fn to_vec(&self) -> Vec<PathBuf> {
        self.files.iter().cloned().collect()
    }
}

/// Expand `{a,b}` alternatives; groups may nest and repeat
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0;
    let mut close = None;
    let mut splits = Vec::new();
    for (offset, ch) in pattern[open..].char_indices() {
        let index = open + offset;
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(index);
                    break;
                }
            }
            ',' if depth == 1 => splits.push(index),
            _ => {}
        }
    }

    // Unbalanced braces are matched literally
    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    let mut bounds = vec![open];
    bounds.extend(splits);
    bounds.push(close);

    bounds
        .windows(2)
        .flat_map(|window| {
            let alternative = &pattern[window[0] + 1..window[1]];
            expand_braces(&format!("{prefix}{alternative}{suffix}"))
        })
        .collect()
}

/// Files matched by `spec`'s patterns under `owner_root`, relative to `build_root`
pub fn collect_source_files(spec: &Specification, owner_root: &Path, build_root: &Path) -> InstallResult<Vec<PathBuf>> {
    let definition = spec.defined_in_file().map(Path::to_path_buf).unwrap_or_default();
    let mut matched = SourceFileList::new();
    let owner_str = owner_root.to_str().ok_or_else(|| {
        PodError::parse(&definition, format!("package directory {} is not valid UTF-8", owner_root.display()))
    })?;
    // The root is a literal path, only the pattern part is globbed
    let escaped_root = glob::Pattern::escape(owner_str);

    for pattern in spec.source_files() {
        if !is_safe_path(Path::new(pattern)) {
            return Err(PodError::parse(
                &definition,
                format!("source pattern '{}' leaves the package directory", pattern),
            ));
        }

        let scoped = if owner_root.join(pattern).is_dir() {
            format!("{}/{}", pattern.trim_end_matches('/'), DEFAULT_SOURCE_PATTERN)
        } else {
            pattern.clone()
        };

        for alternative in expand_braces(&scoped) {
            let full = Path::new(&escaped_root).join(&alternative);
            let full = full.to_str().ok_or_else(|| {
                PodError::parse(&definition, format!("source pattern '{}' is not valid UTF-8", pattern))
            })?;
            let paths = glob::glob_with(full, HIDDEN_FILES_EXCLUDED).map_err(|e| {
                PodError::parse(&definition, format!("invalid source pattern '{}': {}", pattern, e))
            })?;

            for path in paths {
                let path = path.map_err(|e| {
                    let failed = e.path().to_path_buf();
                    PodError::io("Failed to read source file", failed, e.into_error())
                })?;
                if !path.is_file() {
                    continue;
                }
                let relative = pathdiff::diff_paths(&path, build_root).unwrap_or(path);
                matched.push(relative);
            }
        }
    }

    debug!("{} matched {} source file(s)", spec, matched.len());
    Ok(matched.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_expand_braces() {
        assert_eq!(expand_braces("Classes/*.m"), vec!["Classes/*.m"]);
        assert_eq!(expand_braces("*.{h,m}"), vec!["*.h", "*.m"]);
        assert_eq!(
            expand_braces("{Source,Extra}/*.{h,c}"),
            vec!["Source/*.h", "Source/*.c", "Extra/*.h", "Extra/*.c"]
        );
        assert_eq!(expand_braces("a{b,c{d,e}}"), vec!["ab", "acd", "ace"]);
        assert_eq!(expand_braces("broken{a,b"), vec!["broken{a,b"]);
    }

    fn spec_with_patterns(patterns: &[&str]) -> Specification {
        let mut spec = Specification::new();
        spec.set_name("SSZipArchive");
        spec.set_version("0.1".parse().unwrap());
        spec.set_source_files(patterns.iter().map(|p| p.to_string()).collect());
        spec
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_collect_directory_and_glob_patterns() {
        let temp_dir = tempdir().unwrap();
        let build_root = temp_dir.path().join("Pods");
        let owner_root = build_root.join("SSZipArchive-0.1");
        touch(&owner_root.join("SSZipArchive.h"));
        touch(&owner_root.join("SSZipArchive.m"));
        touch(&owner_root.join("README.md"));
        touch(&owner_root.join("minizip").join("zip.c"));
        touch(&owner_root.join("minizip").join("zip.h"));
        touch(&owner_root.join("minizip").join("crypt.txt"));

        let spec = spec_with_patterns(&["SSZipArchive.*", "minizip", "minizip/*.h"]);
        let files = collect_source_files(&spec, &owner_root, &build_root).unwrap();

        let files: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
        assert_eq!(
            files,
            vec![
                "SSZipArchive-0.1/SSZipArchive.h".to_string(),
                "SSZipArchive-0.1/SSZipArchive.m".to_string(),
                "SSZipArchive-0.1/minizip/zip.h".to_string(),
                "SSZipArchive-0.1/minizip/zip.c".to_string(),
            ]
        );
    }

    #[test]
    fn test_wildcards_skip_hidden_entries() {
        let temp_dir = tempdir().unwrap();
        let build_root = temp_dir.path().join("Pods");
        let owner_root = build_root.join("Zip-1.0");
        touch(&owner_root.join(".pod-complete"));
        touch(&owner_root.join("Classes").join("Zip.m"));
        touch(&owner_root.join("Classes").join(".DS_Store"));

        let spec = spec_with_patterns(&["*", "Classes/*"]);
        let files = collect_source_files(&spec, &owner_root, &build_root).unwrap();

        assert_eq!(files, vec![PathBuf::from("Zip-1.0/Classes/Zip.m")]);
    }

    #[test]
    fn test_build_root_with_glob_characters() {
        let temp_dir = tempdir().unwrap();
        let build_root = temp_dir.path().join("proj[1]").join("Pods");
        let owner_root = build_root.join("Zip-1.0");
        touch(&owner_root.join("Zip.m"));

        let spec = spec_with_patterns(&["*.m"]);
        let files = collect_source_files(&spec, &owner_root, &build_root).unwrap();

        assert_eq!(files, vec![PathBuf::from("Zip-1.0/Zip.m")]);
    }

    #[test]
    fn test_no_matches_is_empty() {
        let temp_dir = tempdir().unwrap();
        let spec = spec_with_patterns(&["Missing/*.m"]);
        let files = collect_source_files(&spec, temp_dir.path(), temp_dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_escaping_pattern_rejected() {
        let temp_dir = tempdir().unwrap();
        let mut spec = spec_with_patterns(&["../Other/*.m"]);
        spec.set_defined_in_file("/specs/SSZipArchive/0.1/SSZipArchive.podspec.toml");

        let err = collect_source_files(&spec, temp_dir.path(), temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("SSZipArchive.podspec.toml"));
    }

    #[test]
    fn test_source_file_list_dedupes() {
        let mut list = SourceFileList::new();
        assert!(list.push("A/a.m".into()));
        assert!(!list.push("A/a.m".into()));
        assert_eq!(list.extend(vec!["A/a.m".into(), "B/b.m".into()]), 1);
        assert_eq!(list.to_vec(), vec![PathBuf::from("A/a.m"), PathBuf::from("B/b.m")]);
    }
}
