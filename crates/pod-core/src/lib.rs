//! # pod-core
//!
//! Core types and utilities shared across all pod crates.
//!
//! This crate provides:
//! - Version and VersionReq types
//! - Dependency and Specification types for package definitions
//! - PodError enum for unified error handling
//! - Utility functions for paths and fingerprints
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Version, Specification, etc.)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{PodError, PodResult};
pub use types::{
    Dependency, DependencyKind, GitRevision, SourceReference, Specification, SpecificationLookup,
    Version, VersionReq,
};
