//! Dependency resolution for pod
//!
//! This crate walks a root specification's dependency graph, selects one
//! specification per package name and reports which packages are only
//! referenced as the source owner of other packages.

pub mod resolve;
pub mod semver;
pub mod set;
pub mod source;

// Re-export main types
pub use resolve::{Resolution, Resolver};
pub use semver::VersionSelector;
pub use set::{SetReference, SpecificationSet};
pub use source::{InMemorySource, SpecRepository, SpecSource};

use pod_core::error::PodError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, PodError>;
