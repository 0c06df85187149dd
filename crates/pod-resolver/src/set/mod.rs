//! Specification sets.
//!
//! One set per package name in a resolution: the candidate specifications,
//! every reference made to the name, and the winner pinned at first expansion.

use std::sync::Arc;

use pod_core::types::{Dependency, Specification, Version, VersionReq};

/// One incoming reference to a set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetReference {
    pub dependency: Dependency,
    /// Display label of the declaring specification
    pub required_by: String,
}

/// All specifications for one package name and the one chosen
#[derive(Debug, Clone)]
pub struct SpecificationSet {
    name: String,
    /// Lowest version first
    candidates: Vec<Arc<Specification>>,
    winner: Arc<Specification>,
    references: Vec<SetReference>,
}

impl SpecificationSet {
    pub(crate) fn new(name: impl Into<String>, candidates: Vec<Arc<Specification>>, winner: Arc<Specification>) -> Self {
        Self {
            name: name.into(),
            candidates,
            winner,
            references: Vec::new(),
        }
    }

    pub(crate) fn add_reference(&mut self, dependency: Dependency, required_by: impl Into<String>) {
        self.references.push(SetReference {
            dependency,
            required_by: required_by.into(),
        });
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn candidates(&self) -> &[Arc<Specification>] {
        &self.candidates
    }

    pub fn references(&self) -> &[SetReference] {
        &self.references
    }

    pub fn winning_specification(&self) -> &Arc<Specification> {
        &self.winner
    }

    /// Version of the winner
    pub fn version(&self) -> Option<&Version> {
        self.winner.version()
    }

    /// Every reference to this name is a part-of reference.
    ///
    /// Such a package only supplies the source tree for the packages that
    /// are part of it and is not installed on its own.
    pub fn is_only_part_of_other_package(&self) -> bool {
        !self.references.is_empty() && self.references.iter().all(|r| r.dependency.is_part_of())
    }

    /// Every requirement recorded on this set
    pub fn requirements(&self) -> Vec<VersionReq> {
        self.references
            .iter()
            .flat_map(|r| r.dependency.version_reqs.iter().cloned())
            .collect()
    }

    /// References whose requirements the winner does not meet
    pub fn violated_references(&self) -> Vec<&SetReference> {
        match self.winner.version() {
            Some(version) => self
                .references
                .iter()
                .filter(|r| !r.dependency.matches(version))
                .collect(),
            None => Vec::new(),
        }
    }

    /// `= 1.0 (from App), >= 2.0 (from Zip 1.0)`
    pub fn describe_constraints(&self) -> String {
        self.references
            .iter()
            .map(|r| format!("{} (from {})", r.dependency.requirement_string(), r.required_by))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn describe_candidates(&self) -> String {
        if self.candidates.is_empty() {
            return "none".to_string();
        }
        self.candidates
            .iter()
            .filter_map(|spec| spec.version())
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, version: &str) -> Arc<Specification> {
        let mut spec = Specification::new();
        spec.set_name(name);
        spec.set_version(version.parse().unwrap());
        Arc::new(spec)
    }

    fn set_with(references: Vec<Dependency>) -> SpecificationSet {
        let winner = spec("ASIHTTPRequest", "1.8");
        let mut set = SpecificationSet::new("ASIHTTPRequest", vec![winner.clone()], winner);
        for dep in references {
            set.add_reference(dep, "App");
        }
        set
    }

    #[test]
    fn test_only_part_of_requires_all_references() {
        let part_of = Dependency::part_of("ASIHTTPRequest", Vec::new());
        let normal = Dependency::new("ASIHTTPRequest", Vec::new());

        assert!(set_with(vec![part_of.clone()]).is_only_part_of_other_package());
        assert!(set_with(vec![part_of.clone(), part_of.clone()]).is_only_part_of_other_package());
        assert!(!set_with(vec![part_of, normal.clone()]).is_only_part_of_other_package());
        assert!(!set_with(vec![normal]).is_only_part_of_other_package());
        assert!(!set_with(Vec::new()).is_only_part_of_other_package());
    }

    #[test]
    fn test_violated_references() {
        let ok = Dependency::parse("ASIHTTPRequest", &[">= 1.0"]).unwrap();
        let bad = Dependency::parse("ASIHTTPRequest", &["~> 2.0"]).unwrap();
        let set = set_with(vec![ok, bad]);

        let violated = set.violated_references();
        assert_eq!(violated.len(), 1);
        assert_eq!(violated[0].dependency.requirement_string(), "~> 2.0");
        assert_eq!(set.describe_constraints(), ">= 1.0 (from App), ~> 2.0 (from App)");
        assert_eq!(set.describe_candidates(), "1.8");
        assert_eq!(set.requirements().len(), 2);
    }
}
