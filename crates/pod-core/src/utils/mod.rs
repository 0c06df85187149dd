//! Utility functions and helpers.
//!
//! Common functionality used across multiple pod crates.

pub mod hash;
pub mod path;

// Re-export commonly used utilities
pub use hash::{blake3_hash, source_fingerprint};
pub use path::{get_extension, is_safe_path, normalize_path};
