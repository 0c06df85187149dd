//! Transitive-closure resolution
//!
//! A depth-first walk from the root specification's dependencies. Every
//! package name gets one `SpecificationSet`; its winner is pinned when the set
//! is first reached and the winner's dependencies are expanded exactly once.
//! After the walk each winner is checked against every recorded requirement.

use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use pod_core::error::PodError;
use pod_core::types::{Dependency, Specification, SpecificationLookup};
use tracing::{debug, info};

use crate::semver::VersionSelector;
use crate::set::SpecificationSet;
use crate::source::SpecSource;
use crate::ResolverResult;

/// Main dependency resolver
pub struct Resolver {
    source: Arc<dyn SpecSource>,
}

/// Finished resolution: one set per package name in first-discovery order
#[derive(Debug, Clone)]
pub struct Resolution {
    sets: IndexMap<String, SpecificationSet>,
    /// Resolution time in milliseconds
    pub resolution_time_ms: u64,
}

impl Resolver {
    pub fn new(source: Arc<dyn SpecSource>) -> Self {
        Self { source }
    }

    /// Resolve the full closure of `root`'s dependencies.
    ///
    /// Parse failures and unknown names abort immediately; version conflicts
    /// are reported once the walk is complete and nothing has been installed.
    pub fn resolve(&self, root: &Specification) -> ResolverResult<Resolution> {
        let start_time = Instant::now();
        let mut sets = IndexMap::new();

        info!("Resolving dependencies of {}", root);
        self.expand(root, &mut sets)?;
        verify(&sets)?;

        let resolution = Resolution {
            sets,
            resolution_time_ms: start_time.elapsed().as_millis() as u64,
        };
        info!(
            "Resolved {} package(s) in {}ms",
            resolution.len(),
            resolution.resolution_time_ms
        );
        Ok(resolution)
    }

    fn expand(&self, spec: &Specification, sets: &mut IndexMap<String, SpecificationSet>) -> ResolverResult<()> {
        let required_by = spec.to_string();

        for dependency in spec.dependencies() {
            if let Some(set) = sets.get_mut(&dependency.name) {
                debug!("{} already expanded, recording {}", dependency.name, dependency);
                set.add_reference(dependency.clone(), required_by.as_str());
                continue;
            }

            let candidates = self
                .source
                .candidates(&dependency.name)
                .map_err(|e| match e {
                    PodError::PackageNotFound { name, required_by: None } => PodError::PackageNotFound {
                        name,
                        required_by: Some(spec.origin()),
                    },
                    other => other,
                })?;
            let winner = pin_winner(dependency, &candidates, &required_by)?;
            debug!("Selected {} for {}", winner, dependency);

            let mut set = SpecificationSet::new(dependency.name.clone(), candidates, Arc::clone(&winner));
            set.add_reference(dependency.clone(), required_by.as_str());
            sets.insert(dependency.name.clone(), set);

            self.expand(&winner, sets)?;
        }

        Ok(())
    }
}

/// Highest candidate satisfying the requirements known when the name is first reached
fn pin_winner(
    dependency: &Dependency,
    candidates: &[Arc<Specification>],
    required_by: &str,
) -> ResolverResult<Arc<Specification>> {
    let selector = VersionSelector::new(candidates);

    selector
        .select_preferred(&dependency.version_reqs)
        .cloned()
        .ok_or_else(|| PodError::UnsatisfiableConstraint {
            package: dependency.name.clone(),
            constraints: format!("{} (from {})", dependency.requirement_string(), required_by),
            available: candidates
                .iter()
                .filter_map(|spec| spec.version())
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Check every pinned winner against all requirements recorded on its set
fn verify(sets: &IndexMap<String, SpecificationSet>) -> ResolverResult<()> {
    for set in sets.values() {
        if set.violated_references().is_empty() {
            continue;
        }

        let selector = VersionSelector::new(set.candidates());
        let available = if selector.has_matching(&set.requirements()) {
            // Another version would satisfy everything, but winners are never revisited
            format!(
                "{}; {} was selected first",
                set.describe_candidates(),
                set.winning_specification()
            )
        } else {
            set.describe_candidates()
        };

        return Err(PodError::UnsatisfiableConstraint {
            package: set.name().to_string(),
            constraints: set.describe_constraints(),
            available,
        });
    }
    Ok(())
}

impl Resolution {
    /// Sets in first-discovery order
    pub fn sets(&self) -> impl Iterator<Item = &SpecificationSet> {
        self.sets.values()
    }

    pub fn get(&self, name: &str) -> Option<&SpecificationSet> {
        self.sets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Sets that are installed on their own, in discovery order
    pub fn installable_sets(&self) -> impl Iterator<Item = &SpecificationSet> {
        self.sets.values().filter(|set| !set.is_only_part_of_other_package())
    }
}

impl SpecificationLookup for Resolution {
    fn winning_specification(&self, name: &str) -> Option<Arc<Specification>> {
        self.sets
            .get(name)
            .map(|set| Arc::clone(set.winning_specification()))
    }
}
