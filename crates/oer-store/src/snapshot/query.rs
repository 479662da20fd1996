//! Read-only snapshot ledger queries.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::repo::{conversion, json_column};
use oer_core::model::{ElementType, SnapshotRecord};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, course_id, identifier, title, description, context, license, persons,
    tags, language, resourcetype, classification, course_metadata, additional_data,
    element_type, type_data, release_hash, release_number, time_created";

/// One release run as seen by the pull API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDate {
    pub release_number: i64,
    /// Earliest snapshot time of the run
    pub time_created: i64,
    pub snapshots: i64,
}

pub(crate) fn row_to_snapshot(row: &Row<'_>) -> rusqlite::Result<SnapshotRecord> {
    Ok(SnapshotRecord {
        id: row.get("id")?,
        course_id: row.get("course_id")?,
        identifier: row.get("identifier")?,
        title: row.get("title")?,
        description: row.get("description")?,
        context: row.get("context")?,
        license: row.get("license")?,
        persons: json_column(row, "persons")?,
        tags: row.get("tags")?,
        language: row.get("language")?,
        resourcetype: row.get("resourcetype")?,
        classification: json_column(row, "classification")?,
        course_metadata: json_column(row, "course_metadata")?,
        additional_data: json_column(row, "additional_data")?,
        element_type: ElementType::from_code(row.get("element_type")?).map_err(conversion)?,
        type_data: json_column(row, "type_data")?,
        release_hash: row.get("release_hash")?,
        release_number: row.get("release_number")?,
        time_created: row.get("time_created")?,
    })
}

fn query(conn: &Connection, filter: &str, args: impl rusqlite::Params) -> Result<Vec<SnapshotRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM oer_snapshots {} ORDER BY time_created, id",
            COLUMNS, filter
        ))
        .map_err(from_rusqlite)?;
    let rows = stmt
        .query_map(args, row_to_snapshot)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(rows)
}

/// Latest snapshot of one (course, identifier)
pub fn latest_for(conn: &Connection, course_id: i64, identifier: &str) -> Result<Option<SnapshotRecord>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM oer_snapshots WHERE course_id = ?1 AND identifier = ?2
             ORDER BY time_created DESC, id DESC LIMIT 1",
            COLUMNS
        ),
        params![course_id, identifier],
        row_to_snapshot,
    )
    .optional()
    .map_err(from_rusqlite)
}

/// Every snapshot of an identifier across courses, oldest first
pub fn history_for_identifier(conn: &Connection, identifier: &str) -> Result<Vec<SnapshotRecord>> {
    query(conn, "WHERE identifier = ?1", params![identifier])
}

pub fn by_release_number(conn: &Connection, release_number: i64) -> Result<Vec<SnapshotRecord>> {
    query(conn, "WHERE release_number = ?1", params![release_number])
}

pub fn for_course(conn: &Connection, course_id: i64) -> Result<Vec<SnapshotRecord>> {
    query(conn, "WHERE course_id = ?1", params![course_id])
}

pub fn all_snapshots(conn: &Connection) -> Result<Vec<SnapshotRecord>> {
    query(conn, "", [])
}

pub fn has_snapshot(conn: &Connection, identifier: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM oer_snapshots WHERE identifier = ?1)",
        [identifier],
        |row| row.get(0),
    )
    .map_err(from_rusqlite)
}

pub fn latest_release_number(conn: &Connection) -> Result<Option<i64>> {
    conn.query_row("SELECT MAX(release_number) FROM oer_snapshots", [], |row| {
        row.get(0)
    })
    .map_err(from_rusqlite)
}

/// Release runs, newest first
pub fn release_dates(conn: &Connection) -> Result<Vec<ReleaseDate>> {
    let mut stmt = conn
        .prepare(
            "SELECT release_number, MIN(time_created), COUNT(*) FROM oer_snapshots
             GROUP BY release_number ORDER BY release_number DESC",
        )
        .map_err(from_rusqlite)?;
    let dates = stmt
        .query_map([], |row| {
            Ok(ReleaseDate {
                release_number: row.get(0)?,
                time_created: row.get(1)?,
                snapshots: row.get(2)?,
            })
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(dates)
}
