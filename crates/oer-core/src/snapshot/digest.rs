//! Release hashes.
//!
//! A release hash is the SHA-256 of the canonical JSON of a snapshot
//! candidate. `serde_json` maps are key-sorted, so two candidates with equal
//! content serialize identically regardless of field insertion order.
//! The candidate carries no timestamps of its own, so re-running a release
//! on unchanged data reproduces the previous hash.

use crate::errors::Result;
use crate::snapshot::candidate::SnapshotCandidate;
use sha2::{Digest, Sha256};

/// Hex SHA-256 of the canonical JSON text of `value`.
///
/// # Errors
///
/// `OerError::Serialization` if the value cannot be written as JSON.
pub fn digest_json(value: &serde_json::Value) -> Result<String> {
    let canonical = serde_json::to_string(value)?;
    Ok(sha256_hex(&canonical))
}

/// Release hash of a candidate.
///
/// # Errors
///
/// `OerError::Serialization` if the candidate cannot be written as JSON.
pub fn release_hash(candidate: &SnapshotCandidate) -> Result<String> {
    let value = serde_json::to_value(candidate)?;
    digest_json(&value)
}

/// Hex SHA-256 of `input`. Also used for migration checksums and seed digests.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
