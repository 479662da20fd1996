//! Snapshot domain logic.
//!
//! Builds the candidate row for an element and computes its release hash.
//! Persistence (compare-and-insert) lives in `oer-store`, the release run in
//! `oer-engine`.

pub mod candidate;
pub mod digest;

pub use candidate::{course_metadata_bundle, type_data, SnapshotCandidate};
pub use digest::{digest_json, release_hash, sha256_hex};
