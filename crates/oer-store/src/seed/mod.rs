//! Seed import system
//!
//! Provides:
//! - Seed Format v0 schema
//! - YAML parser with validation
//! - Digest canonicalization
//! - Importer orchestration with provenance in the audit log
//! - Source plugins over the imported rows

pub mod digest;
pub mod format_v0;
pub mod importer;
pub mod parser;
pub mod provenance;
pub mod source;

pub use digest::compute_seed_digest;
pub use format_v0::SeedV0;
pub use importer::{import_seed, ImportReport};
pub use parser::{
    parse_seed_file, parse_seed_file_with_db, parse_seed_str, parse_seed_str_with_db,
};
pub use source::{boxed_plugins, external_identifier, file_identifier, SeedSourcePlugin};
