//! Package specifications.
//!
//! A `Specification` is the declarative description of one package. It is
//! filled in by its declaration methods while a definition file is parsed and
//! is shared read-only (behind `Arc`) afterwards.

use super::{Dependency, SourceReference, Version, VersionReq};
use crate::error::{PodError, PodResult};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Description of one package, or of the root manifest when unnamed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Specification {
    name: Option<String>,
    version: Option<Version>,
    authors: IndexMap<String, Option<String>>,
    homepage: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    source: Option<SourceReference>,
    source_files: Vec<String>,
    build_config: BTreeMap<String, String>,
    part_of: Option<Dependency>,
    dependencies: Vec<Dependency>,
    defined_in_file: Option<PathBuf>,
}

/// Lookup of the winning specification for a package name.
///
/// Implemented by a finished resolution; used to follow `part_of` owner names.
pub trait SpecificationLookup {
    fn winning_specification(&self, name: &str) -> Option<Arc<Specification>>;
}

impl Specification {
    /// Create an empty specification
    pub fn new() -> Self {
        Self::default()
    }

    // Declarations

    pub fn set_name(&mut self, name: impl Into<String>) -> &str {
        self.name.insert(name.into())
    }

    pub fn set_version(&mut self, version: Version) -> &Version {
        self.version.insert(version)
    }

    pub fn set_authors(&mut self, authors: IndexMap<String, Option<String>>) -> &IndexMap<String, Option<String>> {
        self.authors = authors;
        &self.authors
    }

    pub fn set_homepage(&mut self, homepage: impl Into<String>) -> &str {
        self.homepage.insert(homepage.into())
    }

    /// Set the summary; the description defaults to it until set explicitly
    pub fn set_summary(&mut self, summary: impl Into<String>) -> &str {
        let summary = summary.into();
        if self.description.is_none() {
            self.description = Some(summary.clone());
        }
        self.summary.insert(summary)
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &str {
        self.description.insert(description.into())
    }

    /// Declare that this package's source ships inside `name`'s source.
    ///
    /// The part-of dependency is also recorded in `dependencies`; a previous
    /// part-of declaration is replaced.
    pub fn set_part_of(&mut self, name: impl Into<String>, version_reqs: Vec<VersionReq>) -> &Dependency {
        self.dependencies.retain(|dep| !dep.is_part_of());
        let dependency = Dependency::part_of(name, version_reqs);
        self.dependencies.push(dependency.clone());
        self.part_of.insert(dependency)
    }

    /// Declare a part-of relation and an ordinary dependency on the same package
    pub fn set_part_of_dependency(
        &mut self,
        name: impl Into<String>,
        version_reqs: Vec<VersionReq>,
    ) -> &mut Dependency {
        let name = name.into();
        self.set_part_of(name.clone(), version_reqs.clone());
        self.add_dependency(name, version_reqs)
    }

    pub fn set_source_files(&mut self, patterns: Vec<String>) -> &[String] {
        self.source_files = patterns;
        &self.source_files
    }

    pub fn set_source(&mut self, source: SourceReference) -> &SourceReference {
        self.source.insert(source)
    }

    /// Append a normal dependency and return it
    pub fn add_dependency(&mut self, name: impl Into<String>, version_reqs: Vec<VersionReq>) -> &mut Dependency {
        self.dependencies.push(Dependency::new(name, version_reqs));
        let last = self.dependencies.len() - 1;
        &mut self.dependencies[last]
    }

    pub fn set_build_config(&mut self, fragment: BTreeMap<String, String>) -> &BTreeMap<String, String> {
        self.build_config = fragment;
        &self.build_config
    }

    /// Record the file this specification was parsed from
    pub fn set_defined_in_file(&mut self, path: impl Into<PathBuf>) -> &Path {
        self.defined_in_file.insert(path.into())
    }

    // Accessors

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    pub fn authors(&self) -> &IndexMap<String, Option<String>> {
        &self.authors
    }

    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn source(&self) -> Option<&SourceReference> {
        self.source.as_ref()
    }

    pub fn source_files(&self) -> &[String] {
        &self.source_files
    }

    pub fn build_config(&self) -> &BTreeMap<String, String> {
        &self.build_config
    }

    pub fn part_of(&self) -> Option<&Dependency> {
        self.part_of.as_ref()
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn defined_in_file(&self) -> Option<&Path> {
        self.defined_in_file.as_deref()
    }

    // Derived queries

    /// Both name and version are unset
    pub fn is_root_manifest(&self) -> bool {
        self.name.is_none() && self.version.is_none()
    }

    pub fn is_part_of_other_package(&self) -> bool {
        self.part_of.is_some()
    }

    /// Display form plus the definition file, for error messages
    pub fn origin(&self) -> String {
        match (self.identity(), &self.defined_in_file) {
            (Some(_), Some(path)) => format!("{} ({})", self, path.display()),
            _ => self.to_string(),
        }
    }

    /// Name and version of a published package
    pub fn identity(&self) -> Option<(&str, &Version)> {
        match (&self.name, &self.version) {
            (Some(name), Some(version)) => Some((name, version)),
            _ => None,
        }
    }

    /// Directory name of this package inside the build root (`name-version`)
    pub fn destination_dir_name(&self) -> Option<String> {
        self.identity()
            .map(|(name, version)| format!("{}-{}", name, version))
    }

    /// Check the declaration invariants after parsing
    pub fn validate(&self) -> PodResult<()> {
        let path = self.defined_in_file.clone().unwrap_or_default();
        match (&self.name, &self.version) {
            (Some(name), None) => {
                return Err(PodError::parse(path, format!("'{}' declares a name but no version", name)))
            }
            (None, Some(version)) => {
                return Err(PodError::parse(path, format!("version {} declared without a name", version)))
            }
            (Some(name), Some(_)) if name.trim().is_empty() => {
                return Err(PodError::parse(path, "package name must not be empty"))
            }
            _ => {}
        }

        if let Some(dep) = self.dependencies.iter().find(|dep| dep.name.trim().is_empty()) {
            return Err(PodError::parse(path, format!("dependency with empty name ({})", dep)));
        }

        if let (Some(name), Some(part_of)) = (&self.name, &self.part_of) {
            if &part_of.name == name {
                return Err(PodError::PartOfCycle {
                    package: name.clone(),
                    chain: format!("{} -> {}", name, name),
                });
            }
        }

        Ok(())
    }

    /// Follow `part_of` owner names to the specification holding the source.
    ///
    /// Root manifests and packages without `part_of` own themselves.
    pub fn resolve_owning_specification(
        self: &Arc<Self>,
        lookup: &dyn SpecificationLookup,
    ) -> PodResult<Arc<Specification>> {
        let mut current = Arc::clone(self);
        let mut chain = vec![self.to_string()];

        while let Some(part_of) = current.part_of() {
            let owner = lookup
                .winning_specification(&part_of.name)
                .ok_or_else(|| PodError::PackageNotFound {
                    name: part_of.name.clone(),
                    required_by: Some(current.origin()),
                })?;

            let label = owner.to_string();
            if chain.contains(&label) {
                chain.push(label);
                return Err(PodError::PartOfCycle {
                    package: self.to_string(),
                    chain: chain.join(" -> "),
                });
            }
            chain.push(label);
            current = owner;
        }

        Ok(current)
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.identity() {
            Some((name, version)) => write!(f, "{} {}", name, version),
            None => match &self.defined_in_file {
                Some(path) => write!(f, "root manifest at {}", path.display()),
                None => write!(f, "root manifest"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn named(name: &str, version: &str) -> Specification {
        let mut spec = Specification::new();
        spec.set_name(name);
        spec.set_version(version.parse().unwrap());
        spec
    }

    struct Table(HashMap<String, Arc<Specification>>);

    impl SpecificationLookup for Table {
        fn winning_specification(&self, name: &str) -> Option<Arc<Specification>> {
            self.0.get(name).cloned()
        }
    }

    #[test]
    fn test_root_manifest() {
        let mut spec = Specification::new();
        spec.add_dependency("Zip", Vec::new());
        let spec = Arc::new(spec);

        assert!(spec.is_root_manifest());
        assert!(spec.destination_dir_name().is_none());

        let owner = spec.resolve_owning_specification(&Table(HashMap::new())).unwrap();
        assert!(Arc::ptr_eq(&owner, &spec));
    }

    #[test]
    fn test_summary_defaults_description() {
        let mut spec = named("Zip", "1.0");
        spec.set_summary("Zips files");
        assert_eq!(spec.description(), Some("Zips files"));

        spec.set_description("Longer text");
        spec.set_summary("Other summary");
        assert_eq!(spec.description(), Some("Longer text"));
    }

    #[test]
    fn test_part_of_dependency_declares_both() {
        let mut spec = named("ASIWebPageRequest", "1.8");
        let reqs = vec![VersionReq::parse("1.8").unwrap()];
        spec.set_part_of_dependency("ASIHTTPRequest", reqs);

        let part_of = spec.part_of().unwrap();
        assert!(part_of.is_part_of());
        assert_eq!(part_of.name, "ASIHTTPRequest");

        let deps = spec.dependencies();
        assert_eq!(deps.len(), 2);
        assert!(deps.iter().any(|d| d.name == "ASIHTTPRequest" && d.is_part_of()));
        assert!(deps.iter().any(|d| d.name == "ASIHTTPRequest" && !d.is_part_of()));
    }

    #[test]
    fn test_set_part_of_replaces_previous() {
        let mut spec = named("Child", "1.0");
        spec.set_part_of("First", Vec::new());
        spec.set_part_of("Second", Vec::new());

        assert_eq!(spec.part_of().unwrap().name, "Second");
        assert_eq!(spec.dependencies().len(), 1);
        assert_eq!(spec.dependencies()[0].name, "Second");
    }

    #[test]
    fn test_destination_dir_name() {
        assert_eq!(named("Zip", "1.8").destination_dir_name().unwrap(), "Zip-1.8");
    }

    #[test]
    fn test_validate_name_version_duality() {
        let mut spec = Specification::new();
        spec.set_name("Zip");
        assert!(matches!(spec.validate(), Err(PodError::Parse { .. })));

        let mut spec = Specification::new();
        spec.set_version(Version::new(1, 0, 0));
        assert!(spec.validate().is_err());

        assert!(named("Zip", "1.0").validate().is_ok());
        assert!(Specification::new().validate().is_ok());
    }

    #[test]
    fn test_owner_chain_is_followed() {
        let parent = Arc::new(named("Parent", "2.0"));
        let mut middle = named("Middle", "2.0");
        middle.set_part_of("Parent", Vec::new());
        let middle = Arc::new(middle);
        let mut leaf = named("Leaf", "2.0");
        leaf.set_part_of("Middle", Vec::new());
        let leaf = Arc::new(leaf);

        let table = Table(HashMap::from([
            ("Parent".to_string(), parent.clone()),
            ("Middle".to_string(), middle),
        ]));

        let owner = leaf.resolve_owning_specification(&table).unwrap();
        assert!(Arc::ptr_eq(&owner, &parent));
    }

    #[test]
    fn test_owner_cycle_detected() {
        let mut a = named("A", "1.0");
        a.set_part_of("B", Vec::new());
        let mut b = named("B", "1.0");
        b.set_part_of("A", Vec::new());
        let a = Arc::new(a);
        let table = Table(HashMap::from([
            ("A".to_string(), a.clone()),
            ("B".to_string(), Arc::new(b)),
        ]));

        assert!(matches!(
            a.resolve_owning_specification(&table),
            Err(PodError::PartOfCycle { .. })
        ));
    }

    #[test]
    fn test_missing_owner() {
        let mut spec = named("Child", "1.0");
        spec.set_part_of("Ghost", Vec::new());
        let spec = Arc::new(spec);
        assert!(matches!(
            spec.resolve_owning_specification(&Table(HashMap::new())),
            Err(PodError::PackageNotFound { .. })
        ));
    }
}
