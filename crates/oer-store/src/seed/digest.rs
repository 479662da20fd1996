//! Seed digest canonicalization
//!
//! Computes stable SHA256 digests of seeds so re-importing the same
//! content can be detected.

#![allow(clippy::result_large_err)]

use crate::errors::{json_error, Result};
use crate::seed::format_v0::SeedV0;
use oer_core::snapshot::sha256_hex;

/// Compute a stable digest for a seed
///
/// Entries are sorted by their natural keys first, so reordering a seed file
/// does not change its digest.
pub fn compute_seed_digest(seed: &SeedV0) -> Result<String> {
    let json = serde_json::to_string(&canonicalize_seed(seed))
        .map_err(|e| json_error("seed_digest", e))?;
    Ok(sha256_hex(&json))
}

fn canonicalize_seed(seed: &SeedV0) -> SeedV0 {
    let mut canonical = seed.clone();
    canonical.courses.sort_by_key(|c| c.id);
    canonical
        .files
        .sort_by(|a, b| (&a.contenthash, a.course_id, &a.component).cmp(&(&b.contenthash, b.course_id, &b.component)));
    canonical
        .externals
        .sort_by(|a, b| (a.course_id, &a.origin, &a.value).cmp(&(b.course_id, &b.origin, &b.value)));
    canonical.overrides.sort_by(|a, b| {
        (&a.contenthash, a.course_id, &a.course_code).cmp(&(&b.contenthash, b.course_id, &b.course_code))
    });
    canonical
}
