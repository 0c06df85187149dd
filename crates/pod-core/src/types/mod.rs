//! Core data types for pod package management.
//!
//! This module provides the fundamental types used throughout the workspace:
//! - Version types for semantic versioning
//! - Dependency specifications, including part-of references
//! - Package specifications and their source locators

pub mod dependency;
pub mod source;
pub mod specification;
pub mod version;

// Re-export all public types
pub use dependency::{Dependency, DependencyKind};
pub use source::{GitRevision, SourceReference};
pub use specification::{Specification, SpecificationLookup};
pub use version::{Comparator, Op, PartialVersion, Version, VersionError, VersionReq};
