//! Blake3 fingerprints.
//!
//! Used to tell whether an installed destination was fetched from the source a
//! specification currently declares.

use crate::types::SourceReference;

/// Compute Blake3 hash of data
pub fn blake3_hash(data: &[u8]) -> String {
    let hash = blake3::hash(data);
    hash.to_hex().to_string()
}

/// Fingerprint of a source reference, stable across runs
pub fn source_fingerprint(source: Option<&SourceReference>) -> String {
    match source {
        Some(source) => blake3_hash(source.to_string().as_bytes()),
        None => blake3_hash(b""),
    }
}
