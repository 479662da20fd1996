//! Stored element metadata (`oer_elements`)

#![allow(clippy::result_large_err)]

use super::{conversion, json_column, now};
use crate::errors::{from_rusqlite, json_error, Result};
use oer_core::model::{ReleaseState, StoredMetadata};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, course_id, identifier, title, description, license, context, language,
    resourcetype, tags, persons, classification, release_state, user_modified,
    time_created, time_modified";

pub struct MetadataRepo;

impl MetadataRepo {
    pub fn get_by_identifier(conn: &Connection, identifier: &str) -> Result<Option<StoredMetadata>> {
        conn.query_row(
            &format!("SELECT {} FROM oer_elements WHERE identifier = ?1", COLUMNS),
            [identifier],
            row_to_metadata,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    pub fn list_by_course(conn: &Connection, course_id: i64) -> Result<Vec<StoredMetadata>> {
        Self::query_list(
            conn,
            &format!(
                "SELECT {} FROM oer_elements WHERE course_id = ?1 ORDER BY id",
                COLUMNS
            ),
            params![course_id],
        )
    }

    /// Records whose release flag is set
    pub fn list_flagged_for_release(conn: &Connection) -> Result<Vec<StoredMetadata>> {
        Self::query_list(
            conn,
            &format!(
                "SELECT {} FROM oer_elements WHERE release_state = ?1 ORDER BY id",
                COLUMNS
            ),
            params![ReleaseState::Release.code()],
        )
    }

    /// Distinct course ids owning metadata flagged for release
    pub fn courses_with_release_flag(conn: &Connection) -> Result<Vec<i64>> {
        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT course_id FROM oer_elements WHERE release_state = ?1 ORDER BY course_id",
            )
            .map_err(from_rusqlite)?;
        let ids = stmt
            .query_map([ReleaseState::Release.code()], |row| row.get(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<i64>, _>>()
            .map_err(from_rusqlite)?;
        Ok(ids)
    }

    /// Insert a new record; timestamps are set here. Returns the row id.
    pub fn insert(conn: &Connection, record: &StoredMetadata) -> Result<i64> {
        let persons =
            serde_json::to_string(&record.persons).map_err(|e| json_error("metadata_insert", e))?;
        let classification = serde_json::to_string(&record.classification)
            .map_err(|e| json_error("metadata_insert", e))?;
        let ts = now();
        conn.execute(
            "INSERT INTO oer_elements (course_id, identifier, title, description, license,
                context, language, resourcetype, tags, persons, classification, release_state,
                user_modified, time_created, time_modified)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
            params![
                record.course_id,
                record.identifier,
                record.title,
                record.description,
                record.license,
                record.context,
                record.language,
                record.resourcetype,
                record.tags,
                persons,
                classification,
                record.release_state.code(),
                record.user_modified,
                ts,
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(conn.last_insert_rowid())
    }

    /// Overwrite every editable column of the record with the given id.
    ///
    /// No version check: the last writer wins.
    pub fn update(conn: &Connection, record: &StoredMetadata) -> Result<()> {
        let persons =
            serde_json::to_string(&record.persons).map_err(|e| json_error("metadata_update", e))?;
        let classification = serde_json::to_string(&record.classification)
            .map_err(|e| json_error("metadata_update", e))?;
        conn.execute(
            "UPDATE oer_elements SET title = ?1, description = ?2, license = ?3, context = ?4,
                language = ?5, resourcetype = ?6, tags = ?7, persons = ?8, classification = ?9,
                release_state = ?10, user_modified = ?11, time_modified = ?12
             WHERE id = ?13",
            params![
                record.title,
                record.description,
                record.license,
                record.context,
                record.language,
                record.resourcetype,
                record.tags,
                persons,
                classification,
                record.release_state.code(),
                record.user_modified,
                now(),
                record.id,
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Hand ownership of a record to another course
    pub fn move_to_course(conn: &Connection, identifier: &str, course_id: i64) -> Result<()> {
        conn.execute(
            "UPDATE oer_elements SET course_id = ?1, time_modified = ?2 WHERE identifier = ?3",
            params![course_id, now(), identifier],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn set_release_state(conn: &Connection, id: i64, state: ReleaseState) -> Result<()> {
        conn.execute(
            "UPDATE oer_elements SET release_state = ?1, time_modified = ?2 WHERE id = ?3",
            params![state.code(), now(), id],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    fn query_list(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<StoredMetadata>> {
        let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(params, row_to_metadata)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }
}

fn row_to_metadata(row: &Row<'_>) -> rusqlite::Result<StoredMetadata> {
    Ok(StoredMetadata {
        id: row.get("id")?,
        course_id: row.get("course_id")?,
        identifier: row.get("identifier")?,
        title: row.get("title")?,
        description: row.get("description")?,
        license: row.get("license")?,
        context: row.get("context")?,
        language: row.get("language")?,
        resourcetype: row.get("resourcetype")?,
        tags: row.get("tags")?,
        persons: json_column(row, "persons")?,
        classification: json_column(row, "classification")?,
        release_state: ReleaseState::from_code(row.get("release_state")?).map_err(conversion)?,
        user_modified: row.get("user_modified")?,
        time_created: row.get("time_created")?,
        time_modified: row.get("time_modified")?,
    })
}
