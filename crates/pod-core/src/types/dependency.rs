//! Dependency types.
//!
//! A dependency names another package and constrains its version. A part-of
//! dependency additionally says that the declaring package's source ships
//! inside the named package's source tree.

use super::{Version, VersionError, VersionReq};
use std::fmt;

/// Dependency on another package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    /// Every requirement must hold; empty means any version
    pub version_reqs: Vec<VersionReq>,
    pub kind: DependencyKind,
}

/// Type of dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    /// The package's functionality is required
    Normal,
    /// The declaring package's source lives inside this package's source
    PartOf,
}

impl Dependency {
    /// Create a new normal dependency
    pub fn new(name: impl Into<String>, version_reqs: Vec<VersionReq>) -> Self {
        Self {
            name: name.into(),
            version_reqs,
            kind: DependencyKind::Normal,
        }
    }

    /// Create a part-of dependency
    pub fn part_of(name: impl Into<String>, version_reqs: Vec<VersionReq>) -> Self {
        Self {
            name: name.into(),
            version_reqs,
            kind: DependencyKind::PartOf,
        }
    }

    /// Create a normal dependency from requirement strings
    pub fn parse<S: AsRef<str>>(name: &str, requirements: &[S]) -> Result<Self, VersionError> {
        let version_reqs = requirements
            .iter()
            .map(|req| VersionReq::parse(req.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(name, version_reqs))
    }

    /// Turn this into a part-of dependency
    pub fn mark_part_of(&mut self) {
        self.kind = DependencyKind::PartOf;
    }

    /// Check if this is a part-of reference
    pub fn is_part_of(&self) -> bool {
        self.kind.is_part_of()
    }

    /// Check if a version satisfies all requirements
    pub fn matches(&self, version: &Version) -> bool {
        self.version_reqs.iter().all(|req| req.matches(version))
    }

    /// Requirements joined for display, `*` when unconstrained
    pub fn requirement_string(&self) -> String {
        if self.version_reqs.is_empty() {
            "*".to_string()
        } else {
            self.version_reqs
                .iter()
                .map(|req| req.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.requirement_string())?;
        if self.is_part_of() {
            write!(f, " [part of]")?;
        }
        Ok(())
    }
}

impl DependencyKind {
    /// Check if this kind marks a part-of relationship
    pub fn is_part_of(&self) -> bool {
        matches!(self, DependencyKind::PartOf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_creation() {
        let version_req = VersionReq::parse("~> 1.4").unwrap();
        let dep = Dependency::new("JSONKit", vec![version_req.clone()]);

        assert_eq!(dep.name, "JSONKit");
        assert_eq!(dep.version_reqs, vec![version_req]);
        assert_eq!(dep.kind, DependencyKind::Normal);
        assert!(!dep.is_part_of());
    }

    #[test]
    fn test_part_of_dependency() {
        let mut dep = Dependency::parse("ASIHTTPRequest", &["1.8"]).unwrap();
        assert!(!dep.is_part_of());
        dep.mark_part_of();
        assert!(dep.is_part_of());
        assert_eq!(dep.to_string(), "ASIHTTPRequest (= 1.8) [part of]");
    }

    #[test]
    fn test_matches_all_requirements() {
        let dep = Dependency::parse("Zip", &[">= 1.0", "< 1.5"]).unwrap();
        assert!(dep.matches(&Version::new(1, 4, 0)));
        assert!(!dep.matches(&Version::new(1, 5, 0)));
        assert!(!dep.matches(&Version::new(0, 9, 0)));
    }

    #[test]
    fn test_unconstrained_dependency() {
        let dep = Dependency::new("Zip", Vec::new());
        assert!(dep.matches(&Version::new(42, 0, 0)));
        assert_eq!(dep.requirement_string(), "*");
    }

    #[test]
    fn test_invalid_requirement() {
        assert!(Dependency::parse("Zip", &["~> what"]).is_err());
    }
}
