//! Version selection among candidate specifications
//!
//! Picks the highest candidate satisfying a set of requirements, preferring
//! stable releases over prereleases.

use std::collections::BTreeMap;
use std::sync::Arc;

use pod_core::types::{Specification, Version, VersionReq};

/// Version selector for finding best matching candidates
#[derive(Debug, Clone)]
pub struct VersionSelector {
    /// Candidates keyed by version, ascending
    available: BTreeMap<Version, Arc<Specification>>,
}

impl VersionSelector {
    /// Create a selector over named specifications; a later duplicate version replaces an earlier one
    pub fn new(candidates: &[Arc<Specification>]) -> Self {
        let available = candidates
            .iter()
            .filter_map(|spec| spec.version().map(|v| (v.clone(), Arc::clone(spec))))
            .collect();
        Self { available }
    }

    /// Highest candidate matching all constraints
    pub fn select_best(&self, constraints: &[VersionReq]) -> Option<&Arc<Specification>> {
        self.available
            .iter()
            .rev()
            .find(|(version, _)| constraints.iter().all(|req| req.matches(version)))
            .map(|(_, spec)| spec)
    }

    /// Highest stable candidate matching all constraints
    pub fn select_best_stable(&self, constraints: &[VersionReq]) -> Option<&Arc<Specification>> {
        self.available
            .iter()
            .rev()
            .filter(|(version, _)| !version.is_prerelease())
            .find(|(version, _)| constraints.iter().all(|req| req.matches(version)))
            .map(|(_, spec)| spec)
    }

    /// Stable first, prerelease only when nothing stable matches
    pub fn select_preferred(&self, constraints: &[VersionReq]) -> Option<&Arc<Specification>> {
        self.select_best_stable(constraints)
            .or_else(|| self.select_best(constraints))
    }

    /// Check if any candidate satisfies the constraints
    pub fn has_matching(&self, constraints: &[VersionReq]) -> bool {
        self.available
            .keys()
            .any(|version| constraints.iter().all(|req| req.matches(version)))
    }

    pub fn highest_version(&self) -> Option<&Version> {
        self.available.keys().next_back()
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(versions: &[&str]) -> Vec<Arc<Specification>> {
        versions
            .iter()
            .map(|v| {
                let mut spec = Specification::new();
                spec.set_name("Zip");
                spec.set_version(v.parse().unwrap());
                Arc::new(spec)
            })
            .collect()
    }

    fn selected(selector: &VersionSelector, reqs: &[&str]) -> Option<String> {
        let reqs: Vec<VersionReq> = reqs.iter().map(|r| VersionReq::parse(r).unwrap()).collect();
        selector
            .select_preferred(&reqs)
            .map(|spec| spec.version().unwrap().to_string())
    }

    #[test]
    fn test_select_highest_matching() {
        let selector = VersionSelector::new(&candidates(&["1.0", "1.1", "1.2", "2.0", "2.1"]));

        assert_eq!(selected(&selector, &["~> 1.1"]), Some("1.2".to_string()));
        assert_eq!(selected(&selector, &["~> 1.1.0"]), Some("1.1".to_string()));
        assert_eq!(selected(&selector, &[">= 1.0", "< 2.0"]), Some("1.2".to_string()));
        assert_eq!(selected(&selector, &[]), Some("2.1".to_string()));
        assert_eq!(selected(&selector, &["> 3.0"]), None);
    }

    #[test]
    fn test_stable_preferred() {
        let selector = VersionSelector::new(&candidates(&["1.0", "2.0.0-beta.1"]));
        assert_eq!(selected(&selector, &[]), Some("1.0".to_string()));
        assert_eq!(selected(&selector, &[">= 2.0.0-alpha"]), Some("2.0.0-beta.1".to_string()));
    }

    #[test]
    fn test_has_matching() {
        let selector = VersionSelector::new(&candidates(&["1.0", "1.5"]));
        let reqs = [VersionReq::parse(">= 1.2").unwrap()];
        assert!(selector.has_matching(&reqs));

        let reqs = [VersionReq::parse(">= 1.2").unwrap(), VersionReq::parse("< 1.4").unwrap()];
        assert!(!selector.has_matching(&reqs));
        assert_eq!(selector.highest_version().unwrap().to_string(), "1.5");
        assert_eq!(selector.len(), 2);
    }
}
