//! Semantic version types.
//!
//! Provides `Version` and `VersionReq`. Versions keep the precision they were
//! written with (`1.8` stays `1.8` when displayed) but order and compare as if
//! missing components were zero.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Semantic version (major[.minor[.patch]][-prerelease][+build])
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub build: Option<String>,
    /// Number of numeric components present in the source text (1..=3)
    precision: u8,
}

/// Version requirement (`~> 1.4`, `>= 1.0, < 2.0`, `^1.2.3`, `*`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionReq {
    pub comparators: Vec<Comparator>,
}

/// Individual version comparator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Comparator {
    pub op: Op,
    pub version: PartialVersion,
}

/// Comparison operator for version requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Exact,       // =1.0.0
    NotEqual,    // !=1.0.0
    Greater,     // >1.0.0
    GreaterEq,   // >=1.0.0
    Less,        // <1.0.0
    LessEq,      // <=1.0.0
    Tilde,       // ~1.0.0
    Caret,       // ^1.0.0
    Pessimistic, // ~> 1.0
    Wildcard,    // *
}

/// Partial version for comparisons (may have missing components)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartialVersion {
    pub major: u64,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub prerelease: Option<String>,
}

/// Version parsing and validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version format: {input}")]
    InvalidFormat { input: String },

    #[error("Invalid number in version: {component}")]
    InvalidNumber { component: String },

    #[error("Invalid prerelease identifier: {prerelease}")]
    InvalidPrerelease { prerelease: String },

    #[error("Invalid version requirement: {input}")]
    InvalidRequirement { input: String },
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
            precision: 3,
        }
    }

    /// Check if this version satisfies a version requirement
    pub fn satisfies(&self, req: &VersionReq) -> bool {
        req.matches(self)
    }

    /// Check if this is a prerelease version
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Get the precedence for comparison (ignores build metadata and precision)
    fn precedence_cmp(&self, other: &Self) -> Ordering {
        match (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch)) {
            Ordering::Equal => match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => compare_prerelease(a, b),
            },
            other => other,
        }
    }
}

/// Dot-separated identifiers; numeric identifiers compare numerically and sort
/// before alphanumeric ones.
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

/// Split `core-prerelease` and parse 1 to 3 numeric components.
fn parse_components(input: &str) -> Result<(Vec<u64>, Option<String>), VersionError> {
    let (core_part, prerelease) = match input.split_once('-') {
        Some((c, p)) => {
            if p.is_empty() || p.split('.').any(|ident| ident.is_empty()) {
                return Err(VersionError::InvalidPrerelease {
                    prerelease: p.to_string(),
                });
            }
            (c, Some(p.to_string()))
        }
        None => (input, None),
    };

    let parts: Vec<&str> = core_part.split('.').collect();
    if core_part.is_empty() || parts.len() > 3 {
        return Err(VersionError::InvalidFormat {
            input: input.to_string(),
        });
    }

    let numbers = parts
        .iter()
        .map(|part| {
            part.parse::<u64>().map_err(|_| VersionError::InvalidNumber {
                component: part.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((numbers, prerelease))
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();

        // Split on '+' for build metadata
        let (version_part, build) = match input.split_once('+') {
            Some((v, b)) => (v, Some(b.to_string())),
            None => (input, None),
        };

        let (numbers, prerelease) = parse_components(version_part)?;

        Ok(Version {
            major: numbers[0],
            minor: numbers.get(1).copied().unwrap_or(0),
            patch: numbers.get(2).copied().unwrap_or(0),
            prerelease,
            build,
            precision: numbers.len() as u8,
        })
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if self.precision >= 2 {
            write!(f, ".{}", self.minor)?;
        }
        if self.precision >= 3 {
            write!(f, ".{}", self.patch)?;
        }

        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }

        if let Some(ref build) = self.build {
            write!(f, "+{}", build)?;
        }

        Ok(())
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.precedence_cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.prerelease.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence_cmp(other)
    }
}

impl VersionReq {
    /// Requirement that matches every version
    pub fn any() -> Self {
        VersionReq {
            comparators: vec![Comparator::wildcard()],
        }
    }

    /// Parse a version requirement string; comparators are separated by commas
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::any());
        }

        let comparators = input
            .split(',')
            .map(Comparator::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VersionReq { comparators })
    }

    /// Check if a version matches this requirement
    pub fn matches(&self, version: &Version) -> bool {
        self.comparators.iter().all(|comp| comp.matches(version))
    }
}

impl FromStr for VersionReq {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionReq::parse(s)
    }
}

impl fmt::Display for VersionReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.comparators.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl Comparator {
    fn wildcard() -> Self {
        Comparator {
            op: Op::Wildcard,
            version: PartialVersion {
                major: 0,
                minor: None,
                patch: None,
                prerelease: None,
            },
        }
    }

    /// Parse a single comparator such as `>= 1.2` or `~> 1.4.1`
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(VersionError::InvalidRequirement {
                input: input.to_string(),
            });
        }
        if input == "*" {
            return Ok(Self::wildcard());
        }

        // Longest operators first so "~>" is not read as "~"
        let (op, version_str) = if let Some(stripped) = input.strip_prefix("~>") {
            (Op::Pessimistic, stripped)
        } else if let Some(stripped) = input.strip_prefix(">=") {
            (Op::GreaterEq, stripped)
        } else if let Some(stripped) = input.strip_prefix("<=") {
            (Op::LessEq, stripped)
        } else if let Some(stripped) = input.strip_prefix("!=") {
            (Op::NotEqual, stripped)
        } else if let Some(stripped) = input.strip_prefix('^') {
            (Op::Caret, stripped)
        } else if let Some(stripped) = input.strip_prefix('~') {
            (Op::Tilde, stripped)
        } else if let Some(stripped) = input.strip_prefix('>') {
            (Op::Greater, stripped)
        } else if let Some(stripped) = input.strip_prefix('<') {
            (Op::Less, stripped)
        } else if let Some(stripped) = input.strip_prefix('=') {
            (Op::Exact, stripped)
        } else {
            (Op::Exact, input)
        };

        let version = PartialVersion::parse(version_str.trim()).map_err(|_| {
            VersionError::InvalidRequirement {
                input: input.to_string(),
            }
        })?;

        Ok(Comparator { op, version })
    }

    /// Check if a version matches this comparator
    pub fn matches(&self, version: &Version) -> bool {
        match self.op {
            Op::Exact => self.version.matches_exact(version),
            Op::NotEqual => !self.version.matches_exact(version),
            Op::Wildcard => true,
            Op::Greater => version > &self.version.to_version(),
            Op::GreaterEq => version >= &self.version.to_version(),
            Op::Less => version < &self.version.to_version(),
            Op::LessEq => version <= &self.version.to_version(),
            Op::Tilde => self.version.matches_tilde(version),
            Op::Caret => self.version.matches_caret(version),
            Op::Pessimistic => self.version.matches_pessimistic(version),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            Op::Wildcard => return write!(f, "*"),
            Op::Exact => "= ",
            Op::NotEqual => "!= ",
            Op::Greater => "> ",
            Op::GreaterEq => ">= ",
            Op::Less => "< ",
            Op::LessEq => "<= ",
            Op::Tilde => "~",
            Op::Caret => "^",
            Op::Pessimistic => "~> ",
        };
        write!(f, "{}{}", op, self.version)
    }
}

impl PartialVersion {
    fn parse(input: &str) -> Result<Self, VersionError> {
        let (numbers, prerelease) = parse_components(input)?;
        Ok(PartialVersion {
            major: numbers[0],
            minor: numbers.get(1).copied(),
            patch: numbers.get(2).copied(),
            prerelease,
        })
    }

    /// Convert to a full version (filling missing parts with 0)
    pub fn to_version(&self) -> Version {
        Version {
            major: self.major,
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            prerelease: self.prerelease.clone(),
            build: None,
            precision: 3,
        }
    }

    /// Check exact match; missing components match anything
    fn matches_exact(&self, version: &Version) -> bool {
        version.major == self.major
            && self.minor.map_or(true, |m| version.minor == m)
            && self.patch.map_or(true, |p| version.patch == p)
            && version.prerelease == self.prerelease
    }

    /// Check tilde match (~1.2.3 allows >=1.2.3 <1.3.0)
    fn matches_tilde(&self, version: &Version) -> bool {
        if version.major != self.major {
            return false;
        }

        match self.minor {
            Some(minor) => version.minor == minor && version.patch >= self.patch.unwrap_or(0),
            None => true,
        }
    }

    /// Check caret match (^1.2.3 allows >=1.2.3 <2.0.0, ^0.2.3 allows >=0.2.3 <0.3.0)
    fn matches_caret(&self, version: &Version) -> bool {
        if version.major != self.major {
            return false;
        }
        if self.major == 0 {
            if let Some(minor) = self.minor {
                if version.minor != minor {
                    return false;
                }
            }
        }

        version >= &self.to_version()
    }

    /// Check pessimistic match (~> 1.4 allows >=1.4 <2.0, ~> 1.4.2 allows >=1.4.2 <1.5)
    fn matches_pessimistic(&self, version: &Version) -> bool {
        if version < &self.to_version() {
            return false;
        }

        match (self.minor, self.patch) {
            (Some(minor), Some(_)) => version.major == self.major && version.minor == minor,
            (Some(_), None) | (None, _) => version.major == self.major,
        }
    }
}

impl fmt::Display for PartialVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{}", minor)?;
        }
        if let Some(patch) = self.patch {
            write!(f, ".{}", patch)?;
        }
        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        let v = Version::from_str("1.2.3").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.patch, 3);
        assert_eq!(v.prerelease, None);
        assert_eq!(v.build, None);
    }

    #[test]
    fn test_short_version_keeps_precision() {
        let v = Version::from_str("1.8").unwrap();
        assert_eq!(v.to_string(), "1.8");
        assert_eq!(v, Version::new(1, 8, 0));
        assert_eq!(Version::from_str("3").unwrap().to_string(), "3");
    }

    #[test]
    fn test_version_with_prerelease_and_build() {
        let v = Version::from_str("1.2.3-alpha.1+build.7").unwrap();
        assert_eq!(v.prerelease, Some("alpha.1".to_string()));
        assert_eq!(v.build, Some("build.7".to_string()));
        assert_eq!(v.to_string(), "1.2.3-alpha.1+build.7");
    }

    #[test]
    fn test_invalid_versions() {
        assert!(Version::from_str("").is_err());
        assert!(Version::from_str("1.2.3.4").is_err());
        assert!(Version::from_str("one.two").is_err());
        assert!(Version::from_str("1.0-").is_err());
    }

    #[test]
    fn test_version_comparison() {
        let v1 = Version::new(1, 0, 0);
        let v2 = Version::new(2, 0, 0);
        let v3 = Version::new(1, 1, 0);

        assert!(v1 < v2);
        assert!(v1 < v3);
        assert!(v3 < v2);
    }

    #[test]
    fn test_prerelease_ordering() {
        let alpha = Version::from_str("1.0.0-alpha").unwrap();
        let alpha2 = Version::from_str("1.0.0-alpha.2").unwrap();
        let alpha10 = Version::from_str("1.0.0-alpha.10").unwrap();
        let release = Version::new(1, 0, 0);

        assert!(alpha < alpha2);
        assert!(alpha2 < alpha10);
        assert!(alpha10 < release);
    }

    #[test]
    fn test_build_metadata_ignored_for_equality() {
        let a = Version::from_str("1.0.0+a").unwrap();
        let b = Version::from_str("1.0.0+b").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_version_req_exact() {
        let req = VersionReq::parse("1.2.3").unwrap();
        assert!(req.matches(&Version::new(1, 2, 3)));
        assert!(!req.matches(&Version::new(1, 2, 4)));
    }

    #[test]
    fn test_version_req_wildcard() {
        let req = VersionReq::parse("*").unwrap();
        assert!(req.matches(&Version::new(1, 2, 3)));
        assert!(req.matches(&Version::new(999, 999, 999)));
        assert_eq!(VersionReq::parse("").unwrap(), VersionReq::any());
    }

    #[test]
    fn test_version_req_caret() {
        let req = VersionReq::parse("^1.2.3").unwrap();
        assert!(req.matches(&Version::new(1, 2, 3)));
        assert!(req.matches(&Version::new(1, 3, 0)));
        assert!(!req.matches(&Version::new(2, 0, 0)));
        assert!(!req.matches(&Version::new(0, 9, 9)));

        let zero = VersionReq::parse("^0.2.3").unwrap();
        assert!(zero.matches(&Version::new(0, 2, 9)));
        assert!(!zero.matches(&Version::new(0, 3, 0)));
    }

    #[test]
    fn test_version_req_pessimistic() {
        let minor = VersionReq::parse("~> 1.4").unwrap();
        assert!(minor.matches(&Version::new(1, 4, 0)));
        assert!(minor.matches(&Version::new(1, 9, 2)));
        assert!(!minor.matches(&Version::new(2, 0, 0)));
        assert!(!minor.matches(&Version::new(1, 3, 9)));

        let patch = VersionReq::parse("~> 1.4.2").unwrap();
        assert!(patch.matches(&Version::new(1, 4, 7)));
        assert!(!patch.matches(&Version::new(1, 5, 0)));
        assert!(!patch.matches(&Version::new(1, 4, 1)));

        let major = VersionReq::parse("~> 1").unwrap();
        assert!(major.matches(&Version::new(1, 0, 0)));
        assert!(major.matches(&Version::new(1, 9, 0)));
        assert!(!major.matches(&Version::new(2, 0, 0)));
        assert!(!major.matches(&Version::new(5, 0, 0)));
        assert!(!major.matches(&Version::new(0, 9, 0)));
    }

    #[test]
    fn test_version_req_operators() {
        let v1_2_3 = Version::new(1, 2, 3);
        let v1_2_4 = Version::new(1, 2, 4);
        let v1_3_0 = Version::new(1, 3, 0);

        let req = VersionReq::parse(">1.2.3").unwrap();
        assert!(!req.matches(&v1_2_3));
        assert!(req.matches(&v1_2_4));

        let req = VersionReq::parse(">= 1.2.3").unwrap();
        assert!(req.matches(&v1_2_3));
        assert!(req.matches(&v1_3_0));

        let req = VersionReq::parse("<1.2.4").unwrap();
        assert!(req.matches(&v1_2_3));
        assert!(!req.matches(&v1_2_4));

        let req = VersionReq::parse("!= 1.2.4").unwrap();
        assert!(req.matches(&v1_2_3));
        assert!(!req.matches(&v1_2_4));
    }

    #[test]
    fn test_version_req_compound() {
        let req = VersionReq::parse(">= 1.0, < 2.0").unwrap();
        assert_eq!(req.comparators.len(), 2);
        assert!(req.matches(&Version::new(1, 5, 0)));
        assert!(!req.matches(&Version::new(2, 0, 0)));
        assert_eq!(req.to_string(), ">= 1.0, < 2.0");
    }

    #[test]
    fn test_invalid_requirement() {
        assert!(VersionReq::parse(">= banana").is_err());
        assert!(VersionReq::parse("1.0,").is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let v: Version = serde_json::from_str("\"1.8\"").unwrap();
        assert_eq!(v.to_string(), "1.8");
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"1.8\"");
    }
}
