//! Snapshot ledger persistence.
//!
//! ## Responsibilities
//!
//! - Compare-and-insert of snapshot candidates inside an immediate transaction
//! - Release number allocation
//! - Read-only ledger queries for the release pull API
//!
//! ## Non-Responsibilities
//!
//! - Candidate construction and hashing (handled by `oer-core`)
//! - Release orchestration (handled by `oer-engine`)

pub mod persist;
pub mod query;

pub use persist::{insert_if_changed, next_release_number, InsertOutcome, ReleaseNumber};
pub use query::{
    all_snapshots, by_release_number, for_course, has_snapshot, history_for_identifier, latest_for,
    latest_release_number, release_dates, ReleaseDate,
};
