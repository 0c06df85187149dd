//! Specification sources.
//!
//! A `SpecSource` lists every known specification for a package name. The
//! on-disk `SpecRepository` parses each definition at most once per process.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use pod_config::{definition_file_name, parse_package_definition};
use pod_core::error::PodError;
use pod_core::types::{Specification, Version};
use tracing::{debug, warn};

use crate::ResolverResult;

/// Provider of candidate specifications by package name
pub trait SpecSource: Send + Sync {
    /// All specifications for `name`, lowest version first.
    ///
    /// Fails with `PackageNotFound` when the name is unknown.
    fn candidates(&self, name: &str) -> ResolverResult<Vec<Arc<Specification>>>;
}

/// Specification repository laid out as `<root>/<Name>/<version>/<Name>.podspec.toml`
#[derive(Debug)]
pub struct SpecRepository {
    root: PathBuf,
    /// Parsed definitions by name and version
    parsed: DashMap<(String, Version), Arc<Specification>>,
}

impl SpecRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            parsed: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the definition file for one name and version directory
    pub fn definition_path(&self, name: &str, version_dir: &str) -> PathBuf {
        self.root.join(name).join(version_dir).join(definition_file_name(name))
    }

    /// Number of definitions parsed so far
    pub fn parsed_count(&self) -> usize {
        self.parsed.len()
    }

    /// Load one exact name and version, reusing an earlier parse
    pub fn specification(&self, name: &str, version_dir: &str) -> ResolverResult<Arc<Specification>> {
        let path = self.definition_path(name, version_dir);
        let version: Version = version_dir
            .parse()
            .map_err(|e| PodError::parse(&path, format!("version directory '{}': {}", version_dir, e)))?;

        let key = (name.to_string(), version.clone());
        if let Some(cached) = self.parsed.get(&key) {
            return Ok(Arc::clone(cached.value()));
        }

        debug!("Parsing definition {}", path.display());
        let spec = parse_package_definition(&path)?;

        // Definitions must describe the directory they live in
        match spec.identity() {
            Some((declared_name, declared_version)) if declared_name == name && *declared_version == version => {}
            _ => {
                return Err(PodError::parse(
                    &path,
                    format!("definition declares {} but is stored as {} {}", spec, name, version_dir),
                ));
            }
        }

        let spec = Arc::new(spec);
        self.parsed.insert(key, Arc::clone(&spec));
        Ok(spec)
    }
}

impl SpecSource for SpecRepository {
    fn candidates(&self, name: &str) -> ResolverResult<Vec<Arc<Specification>>> {
        let package_dir = self.root.join(name);
        if !package_dir.is_dir() {
            return Err(PodError::PackageNotFound {
                name: name.to_string(),
                required_by: None,
            });
        }

        let entries = std::fs::read_dir(&package_dir)
            .map_err(|e| PodError::io("Failed to list specification versions", &package_dir, e))?;

        let mut candidates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PodError::io("Failed to list specification versions", &package_dir, e))?;
            if !entry.path().is_dir() {
                continue;
            }
            let Some(version_dir) = entry.file_name().to_str().map(str::to_string) else {
                warn!("Skipping non-UTF-8 entry in {}", package_dir.display());
                continue;
            };
            if version_dir.parse::<Version>().is_err() {
                warn!("Skipping {}: not a version directory", entry.path().display());
                continue;
            }
            candidates.push(self.specification(name, &version_dir)?);
        }

        if candidates.is_empty() {
            return Err(PodError::PackageNotFound {
                name: name.to_string(),
                required_by: None,
            });
        }

        sort_by_version(&mut candidates);
        Ok(candidates)
    }
}

/// In-memory specification source
#[derive(Debug, Default, Clone)]
pub struct InMemorySource {
    specs: IndexMap<String, Vec<Arc<Specification>>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named specification; root manifests are ignored
    pub fn add(&mut self, spec: Specification) -> &mut Self {
        if let Some((name, _)) = spec.identity() {
            let name = name.to_string();
            let entry = self.specs.entry(name).or_default();
            entry.push(Arc::new(spec));
            sort_by_version(entry);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.specs.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl SpecSource for InMemorySource {
    fn candidates(&self, name: &str) -> ResolverResult<Vec<Arc<Specification>>> {
        self.specs
            .get(name)
            .cloned()
            .ok_or_else(|| PodError::PackageNotFound {
                name: name.to_string(),
                required_by: None,
            })
    }
}

impl<S: SpecSource + ?Sized> SpecSource for Arc<S> {
    fn candidates(&self, name: &str) -> ResolverResult<Vec<Arc<Specification>>> {
        (**self).candidates(name)
    }
}

fn sort_by_version(specs: &mut [Arc<Specification>]) {
    specs.sort_by(|a, b| a.version().cmp(&b.version()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_definition(root: &Path, name: &str, version: &str, extra: &str) {
        let dir = root.join(name).join(version);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(definition_file_name(name)),
            format!("name = \"{name}\"\nversion = \"{version}\"\n{extra}"),
        )
        .unwrap();
    }

    #[test]
    fn test_repository_lists_sorted_candidates() {
        let temp_dir = TempDir::new().unwrap();
        write_definition(temp_dir.path(), "Zip", "1.10", "");
        write_definition(temp_dir.path(), "Zip", "1.2", "");
        write_definition(temp_dir.path(), "Zip", "0.9", "");
        std::fs::create_dir_all(temp_dir.path().join("Zip").join("notes")).unwrap();

        let repo = SpecRepository::new(temp_dir.path());
        let versions: Vec<String> = repo
            .candidates("Zip")
            .unwrap()
            .iter()
            .map(|s| s.version().unwrap().to_string())
            .collect();

        assert_eq!(versions, vec!["0.9", "1.2", "1.10"]);
    }

    #[test]
    fn test_repository_memoizes_parsed_definitions() {
        let temp_dir = TempDir::new().unwrap();
        write_definition(temp_dir.path(), "Zip", "1.0", "");
        let repo = SpecRepository::new(temp_dir.path());

        let first = repo.candidates("Zip").unwrap();
        // A later edit is not re-read within the same repository instance
        write_definition(temp_dir.path(), "Zip", "1.0", "summary = \"changed\"\n");
        let second = repo.candidates("Zip").unwrap();

        assert!(Arc::ptr_eq(&first[0], &second[0]));
        assert_eq!(repo.parsed_count(), 1);
    }

    #[test]
    fn test_unknown_package() {
        let temp_dir = TempDir::new().unwrap();
        let repo = SpecRepository::new(temp_dir.path());
        assert!(matches!(
            repo.candidates("Ghost"),
            Err(PodError::PackageNotFound { .. })
        ));
    }

    #[test]
    fn test_mismatched_definition_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("Zip").join("1.0");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("Zip.podspec.toml"), "name = \"Zip\"\nversion = \"2.0\"\n").unwrap();

        let repo = SpecRepository::new(temp_dir.path());
        match repo.candidates("Zip") {
            Err(PodError::Parse { path, .. }) => assert!(path.ends_with("Zip/1.0/Zip.podspec.toml")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(repo.parsed_count(), 0);
    }

    #[test]
    fn test_broken_definition_names_path() {
        let temp_dir = TempDir::new().unwrap();
        write_definition(temp_dir.path(), "Zip", "1.0", "source_files = 42\n");

        let repo = SpecRepository::new(temp_dir.path());
        let err = repo.candidates("Zip").unwrap_err();
        assert!(err.to_string().contains("Zip.podspec.toml"));
    }

    #[test]
    fn test_in_memory_source() {
        let mut source = InMemorySource::new();
        for version in ["2.0", "1.0"] {
            let mut spec = Specification::new();
            spec.set_name("Zip");
            spec.set_version(version.parse().unwrap());
            source.add(spec);
        }
        source.add(Specification::new());

        assert_eq!(source.len(), 2);
        let candidates = source.candidates("Zip").unwrap();
        assert_eq!(candidates[0].version().unwrap().to_string(), "1.0");
        assert!(source.candidates("Other").is_err());
    }
}
