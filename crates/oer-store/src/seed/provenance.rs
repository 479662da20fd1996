//! Provenance tracking for seed imports
//!
//! Every import leaves `seed_import` rows in the audit log.

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use crate::repo::AuditRepo;
use rusqlite::Connection;

pub const SEED_IMPORT_OP: &str = "seed_import";

#[derive(Debug, Clone, Copy)]
pub enum ProvenanceKind {
    ImportStarted,
    CourseApplied,
    ImportCompleted,
}

impl ProvenanceKind {
    fn as_str(&self) -> &'static str {
        match self {
            ProvenanceKind::ImportStarted => "started",
            ProvenanceKind::CourseApplied => "course_applied",
            ProvenanceKind::ImportCompleted => "completed",
        }
    }
}

pub fn emit(
    conn: &Connection,
    kind: ProvenanceKind,
    seed_digest: &str,
    course_id: Option<i64>,
) -> Result<()> {
    AuditRepo::record(
        conn,
        "INFO",
        SEED_IMPORT_OP,
        None,
        course_id,
        &format!("{} seed_digest={}", kind.as_str(), seed_digest),
    )?;
    Ok(())
}
