//! Snapshot persistence operations.
//!
//! A snapshot row is written only when its release hash differs from the
//! latest row of the same (course, identifier). The comparison and the insert
//! share one `IMMEDIATE` transaction so two writers on the same database
//! cannot both insert the same state. A run that lets its first insert
//! allocate the release number does so inside that transaction, so two
//! concurrent runs never share a number.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, json_error, Result};
use oer_core::errors::{ExError, ExErrorKind};
use oer_core::snapshot::SnapshotCandidate;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

/// Result of a compare-and-insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new ledger row was written
    Inserted {
        id: i64,
        hash: String,
        release_number: i64,
    },
    /// The latest row already carries this hash
    Unchanged { hash: String },
}

impl InsertOutcome {
    pub fn was_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted { .. })
    }

    pub fn hash(&self) -> &str {
        match self {
            InsertOutcome::Inserted { hash, .. } | InsertOutcome::Unchanged { hash } => hash,
        }
    }
}

/// Release number stamped on an inserted row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseNumber {
    Fixed(i64),
    /// Current maximum plus one, read inside the insert transaction
    Allocate,
}

/// Release number for the next run: current maximum plus one.
///
/// ## Errors
///
/// - `ExErrorKind::Persistence`: query failed
pub fn next_release_number(conn: &Connection) -> Result<i64> {
    let max: Option<i64> = conn
        .query_row("SELECT MAX(release_number) FROM oer_snapshots", [], |row| {
            row.get(0)
        })
        .map_err(from_rusqlite)?;
    Ok(max.unwrap_or(0) + 1)
}

fn latest_hash(conn: &Connection, course_id: i64, identifier: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT release_hash FROM oer_snapshots
         WHERE course_id = ?1 AND identifier = ?2
         ORDER BY time_created DESC, id DESC
         LIMIT 1",
        params![course_id, identifier],
        |row| row.get(0),
    )
    .optional()
    .map_err(from_rusqlite)
}

/// Insert `candidate` unless the latest snapshot of its (course, identifier)
/// has the same release hash.
///
/// ## Errors
///
/// - `ExErrorKind::Serialization`: hashing or a JSON column failed to encode
/// - `ExErrorKind::Persistence`: transaction or insert failed
pub fn insert_if_changed(
    conn: &mut Connection,
    candidate: &SnapshotCandidate,
    release_number: ReleaseNumber,
    time_created: i64,
) -> Result<InsertOutcome> {
    let hash = candidate.hash().map_err(|e| {
        ExError::from(e)
            .with_op("snapshot_insert")
            .with_identifier(candidate.identifier.clone())
    })?;

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| {
            ExError::new(ExErrorKind::Persistence)
                .with_op("snapshot_insert")
                .with_message(format!("Failed to start transaction: {}", e))
        })?;

    if latest_hash(&tx, candidate.course_id, &candidate.identifier)?.as_deref() == Some(hash.as_str())
    {
        tracing::debug!(
            identifier = %candidate.identifier,
            course_id = candidate.course_id,
            "Snapshot unchanged, skipping insert"
        );
        return Ok(InsertOutcome::Unchanged { hash });
    }

    let release_number = match release_number {
        ReleaseNumber::Fixed(n) => n,
        ReleaseNumber::Allocate => next_release_number(&tx)?,
    };

    let encode = |value: &serde_json::Value| {
        serde_json::to_string(value).map_err(|e| json_error("snapshot_insert", e))
    };
    let persons =
        serde_json::to_string(&candidate.persons).map_err(|e| json_error("snapshot_insert", e))?;

    tx.execute(
        "INSERT INTO oer_snapshots (course_id, identifier, title, description, context, license,
            persons, tags, language, resourcetype, classification, course_metadata,
            additional_data, element_type, type_data, release_hash, release_number, time_created)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            candidate.course_id,
            candidate.identifier,
            candidate.title,
            candidate.description,
            candidate.context,
            candidate.license,
            persons,
            candidate.tags,
            candidate.language,
            candidate.resourcetype,
            encode(&candidate.classification)?,
            encode(&candidate.course_metadata)?,
            encode(&candidate.additional_data)?,
            candidate.element_type.code(),
            encode(&candidate.type_data)?,
            hash,
            release_number,
            time_created,
        ],
    )
    .map_err(from_rusqlite)?;
    let id = tx.last_insert_rowid();

    tx.commit().map_err(|e| {
        ExError::new(ExErrorKind::Persistence)
            .with_op("snapshot_insert")
            .with_message(format!("Failed to commit transaction: {}", e))
    })?;

    tracing::debug!(
        id,
        identifier = %candidate.identifier,
        course_id = candidate.course_id,
        release_number,
        "Inserted snapshot"
    );

    Ok(InsertOutcome::Inserted {
        id,
        hash,
        release_number,
    })
}
