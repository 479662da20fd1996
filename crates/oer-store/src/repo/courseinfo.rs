//! Course metadata rows (`oer_courseinfo`)

#![allow(clippy::result_large_err)]

use super::now;
use crate::errors::{from_rusqlite, json_error, Result};
use oer_core::errors::{ExError, ExErrorKind};
use oer_core::model::{CourseInfo, CourseInfoField};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;

const COLUMNS: &str = "id, course_id, course_code, subplugin, external_course_id, external_source_id,
    coursename, coursename_edited, structure, structure_edited, description, description_edited,
    objectives, objectives_edited, organisation, organisation_edited, language, language_edited,
    lecturer, lecturer_edited, customfields, deleted, ignored, time_created, time_modified";

pub struct CourseInfoRepo;

impl CourseInfoRepo {
    /// Every row of a course, including deleted and ignored ones
    pub fn list_for_course(conn: &Connection, course_id: i64) -> Result<Vec<CourseInfo>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM oer_courseinfo WHERE course_id = ?1 ORDER BY id",
                COLUMNS
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([course_id], row_to_courseinfo)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    /// Rows that take part in releases
    pub fn list_active_for_course(conn: &Connection, course_id: i64) -> Result<Vec<CourseInfo>> {
        Ok(Self::list_for_course(conn, course_id)?
            .into_iter()
            .filter(CourseInfo::is_active)
            .collect())
    }

    pub fn get(conn: &Connection, id: i64) -> Result<Option<CourseInfo>> {
        conn.query_row(
            &format!("SELECT {} FROM oer_courseinfo WHERE id = ?1", COLUMNS),
            [id],
            row_to_courseinfo,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    pub fn insert(conn: &Connection, info: &CourseInfo) -> Result<i64> {
        let customfields = encode_customfields(info)?;
        let ts = now();
        conn.execute(
            "INSERT INTO oer_courseinfo (course_id, course_code, subplugin, external_course_id,
                external_source_id, coursename, structure, description, objectives, organisation,
                language, lecturer, customfields, deleted, ignored, time_created, time_modified)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)",
            params![
                info.course_id,
                info.course_code,
                info.subplugin,
                info.external_course_id,
                info.external_source_id,
                info.coursename,
                info.structure,
                info.description,
                info.objectives,
                info.organisation,
                info.language,
                info.lecturer,
                customfields,
                info.deleted,
                info.ignored,
                ts,
            ],
        )
        .map_err(from_rusqlite)?;
        let id = conn.last_insert_rowid();
        for field in &info.edited {
            Self::set_edited_flag(conn, id, *field, true)?;
        }
        Ok(id)
    }

    /// Write values, custom fields and flags of an existing row
    pub fn update(conn: &Connection, info: &CourseInfo) -> Result<()> {
        let customfields = encode_customfields(info)?;
        conn.execute(
            "UPDATE oer_courseinfo SET subplugin = ?1, external_course_id = ?2,
                external_source_id = ?3, coursename = ?4, structure = ?5, description = ?6,
                objectives = ?7, organisation = ?8, language = ?9, lecturer = ?10,
                customfields = ?11, deleted = ?12, ignored = ?13, time_modified = ?14
             WHERE id = ?15",
            params![
                info.subplugin,
                info.external_course_id,
                info.external_source_id,
                info.coursename,
                info.structure,
                info.description,
                info.objectives,
                info.organisation,
                info.language,
                info.lecturer,
                customfields,
                info.deleted,
                info.ignored,
                now(),
                info.id,
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        conn.execute("DELETE FROM oer_courseinfo WHERE id = ?1", [id])
            .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn soft_delete(conn: &Connection, id: i64) -> Result<()> {
        conn.execute(
            "UPDATE oer_courseinfo SET deleted = 1, ignored = 1, time_modified = ?1 WHERE id = ?2",
            params![now(), id],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn set_ignored(conn: &Connection, id: i64, ignored: bool) -> Result<()> {
        conn.execute(
            "UPDATE oer_courseinfo SET ignored = ?1, time_modified = ?2 WHERE id = ?3",
            params![ignored, now(), id],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Editor override of one field; the value is protected from later syncs
    pub fn edit_field(conn: &Connection, id: i64, field: CourseInfoField, value: &str) -> Result<()> {
        let changed = conn
            .execute(
                &format!(
                    "UPDATE oer_courseinfo SET {col} = ?1, {col}_edited = 1, time_modified = ?2 WHERE id = ?3",
                    col = field.column()
                ),
                params![value, now(), id],
            )
            .map_err(from_rusqlite)?;
        if changed == 0 {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op("courseinfo_edit_field")
                .with_field(field.column())
                .with_message(format!("course info row {} not found", id)));
        }
        Ok(())
    }

    fn set_edited_flag(conn: &Connection, id: i64, field: CourseInfoField, edited: bool) -> Result<()> {
        conn.execute(
            &format!(
                "UPDATE oer_courseinfo SET {}_edited = ?1 WHERE id = ?2",
                field.column()
            ),
            params![edited, id],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }
}

fn encode_customfields(info: &CourseInfo) -> Result<Option<String>> {
    info.customfields
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| json_error("courseinfo_customfields", e))
}

fn row_to_courseinfo(row: &Row<'_>) -> rusqlite::Result<CourseInfo> {
    let mut edited = BTreeSet::new();
    for field in CourseInfoField::ALL {
        let flag: bool = row.get(format!("{}_edited", field.column()).as_str())?;
        if flag {
            edited.insert(field);
        }
    }
    let customfields: Option<String> = row.get("customfields")?;
    let customfields = customfields
        .map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(CourseInfo {
        id: row.get("id")?,
        course_id: row.get("course_id")?,
        course_code: row.get("course_code")?,
        subplugin: row.get("subplugin")?,
        external_course_id: row.get("external_course_id")?,
        external_source_id: row.get("external_source_id")?,
        coursename: row.get("coursename")?,
        structure: row.get("structure")?,
        description: row.get("description")?,
        objectives: row.get("objectives")?,
        organisation: row.get("organisation")?,
        language: row.get("language")?,
        lecturer: row.get("lecturer")?,
        edited,
        customfields,
        deleted: row.get("deleted")?,
        ignored: row.get("ignored")?,
        time_created: row.get("time_created")?,
        time_modified: row.get("time_modified")?,
    })
}
