//! Host LMS data: courses, file usage, external elements, per-file overrides

#![allow(clippy::result_large_err)]

use super::{json_column, now};
use crate::errors::{from_rusqlite, json_error, Result};
use oer_core::errors::ExResult;
use oer_core::model::{CourseOverride, LmsCourse, OverrideState};
use oer_core::plugin::UsageLookup;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One reference of a stored file from a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUsageRow {
    pub contenthash: String,
    pub course_id: i64,
    pub component: String,
    pub filename: String,
    pub mimetype: String,
    pub filesize: i64,
    pub timecreated: i64,
    pub license: String,
    pub author: String,
}

/// An external resource linked from a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRow {
    pub course_id: i64,
    pub origin: String,
    pub value: String,
    pub title: String,
    pub url: String,
    pub license: String,
    pub author: String,
    /// JSON array of `{area, name, url, raw_data, metadata_field}`
    pub information: serde_json::Value,
}

pub struct CourseRepo;

impl CourseRepo {
    pub fn upsert_course(conn: &Connection, course: &LmsCourse) -> Result<()> {
        let lecturers =
            serde_json::to_string(&course.lecturers).map_err(|e| json_error("course_upsert", e))?;
        let customfields = serde_json::to_string(&course.customfields)
            .map_err(|e| json_error("course_upsert", e))?;
        conn.execute(
            "INSERT INTO courses (id, fullname, shortname, summary, format, language, visible,
                lecturers, customfields)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET fullname = excluded.fullname,
                shortname = excluded.shortname, summary = excluded.summary,
                format = excluded.format, language = excluded.language,
                visible = excluded.visible, lecturers = excluded.lecturers,
                customfields = excluded.customfields",
            params![
                course.id,
                course.fullname,
                course.shortname,
                course.summary,
                course.format,
                course.language,
                course.visible,
                lecturers,
                customfields,
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn get_course(conn: &Connection, id: i64) -> Result<Option<LmsCourse>> {
        conn.query_row(
            "SELECT id, fullname, shortname, summary, format, language, visible, lecturers,
                customfields FROM courses WHERE id = ?1",
            [id],
            row_to_course,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    pub fn list_courses(conn: &Connection) -> Result<Vec<LmsCourse>> {
        let mut stmt = conn
            .prepare(
                "SELECT id, fullname, shortname, summary, format, language, visible, lecturers,
                    customfields FROM courses ORDER BY id",
            )
            .map_err(from_rusqlite)?;
        let courses = stmt
            .query_map([], row_to_course)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(courses)
    }

    /// Full names of the given courses; unknown ids are absent
    pub fn course_names(conn: &Connection, ids: &BTreeSet<i64>) -> Result<BTreeMap<i64, String>> {
        let mut names = BTreeMap::new();
        let mut stmt = conn
            .prepare("SELECT fullname FROM courses WHERE id = ?1")
            .map_err(from_rusqlite)?;
        for id in ids {
            let name: Option<String> = stmt
                .query_row([id], |row| row.get(0))
                .optional()
                .map_err(from_rusqlite)?;
            if let Some(name) = name {
                names.insert(*id, name);
            }
        }
        Ok(names)
    }

    pub fn add_file_usage(conn: &Connection, usage: &FileUsageRow) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO file_usage (contenthash, course_id, component, filename,
                mimetype, filesize, timecreated, license, author)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                usage.contenthash,
                usage.course_id,
                usage.component,
                usage.filename,
                usage.mimetype,
                usage.filesize,
                usage.timecreated,
                usage.license,
                usage.author,
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn courses_using(conn: &Connection, contenthash: &str) -> Result<BTreeSet<i64>> {
        let mut stmt = conn
            .prepare("SELECT DISTINCT course_id FROM file_usage WHERE contenthash = ?1")
            .map_err(from_rusqlite)?;
        let ids = stmt
            .query_map([contenthash], |row| row.get::<_, i64>(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<BTreeSet<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(ids)
    }

    /// File usages of one course, optionally limited to one component
    pub fn files_for_course(
        conn: &Connection,
        course_id: i64,
        component: Option<&str>,
    ) -> Result<Vec<FileUsageRow>> {
        let mut stmt = conn
            .prepare(
                "SELECT contenthash, course_id, component, filename, mimetype, filesize,
                    timecreated, license, author
                 FROM file_usage
                 WHERE course_id = ?1 AND (?2 IS NULL OR component = ?2)
                 ORDER BY id",
            )
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(params![course_id, component], |row| {
                Ok(FileUsageRow {
                    contenthash: row.get("contenthash")?,
                    course_id: row.get("course_id")?,
                    component: row.get("component")?,
                    filename: row.get("filename")?,
                    mimetype: row.get("mimetype")?,
                    filesize: row.get("filesize")?,
                    timecreated: row.get("timecreated")?,
                    license: row.get("license")?,
                    author: row.get("author")?,
                })
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    /// Distinct components that registered file usages
    pub fn file_components(conn: &Connection) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare("SELECT DISTINCT component FROM file_usage ORDER BY component")
            .map_err(from_rusqlite)?;
        let components = stmt
            .query_map([], |row| row.get(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(from_rusqlite)?;
        Ok(components)
    }

    pub fn add_external(conn: &Connection, row: &ExternalRow) -> Result<()> {
        let information = serde_json::to_string(&row.information)
            .map_err(|e| json_error("external_insert", e))?;
        conn.execute(
            "INSERT OR REPLACE INTO external_elements (course_id, origin, value, title, url,
                license, author, information)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                row.course_id,
                row.origin,
                row.value,
                row.title,
                row.url,
                row.license,
                row.author,
                information,
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn externals_for_course(
        conn: &Connection,
        course_id: i64,
        origin: Option<&str>,
    ) -> Result<Vec<ExternalRow>> {
        let mut stmt = conn
            .prepare(
                "SELECT course_id, origin, value, title, url, license, author, information
                 FROM external_elements
                 WHERE course_id = ?1 AND (?2 IS NULL OR origin = ?2)
                 ORDER BY id",
            )
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(params![course_id, origin], |row| {
                Ok(ExternalRow {
                    course_id: row.get("course_id")?,
                    origin: row.get("origin")?,
                    value: row.get("value")?,
                    title: row.get("title")?,
                    url: row.get("url")?,
                    license: row.get("license")?,
                    author: row.get("author")?,
                    information: json_column(row, "information")?,
                })
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    pub fn external_origins(conn: &Connection) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare("SELECT DISTINCT origin FROM external_elements ORDER BY origin")
            .map_err(from_rusqlite)?;
        let origins = stmt
            .query_map([], |row| row.get(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(from_rusqlite)?;
        Ok(origins)
    }

    /// Record an include/exclude decision for one file and course code
    pub fn set_override(conn: &Connection, rule: &CourseOverride, user_id: i64) -> Result<()> {
        conn.execute(
            "INSERT INTO course_to_file (contenthash, course_id, course_code, state,
                user_modified, time_modified)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(contenthash, course_id, course_code) DO UPDATE SET
                state = excluded.state, user_modified = excluded.user_modified,
                time_modified = excluded.time_modified",
            params![
                rule.contenthash,
                rule.course_id,
                rule.course_code,
                rule.state.code(),
                user_id,
                now(),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn overrides_for(conn: &Connection, contenthash: &str) -> Result<Vec<CourseOverride>> {
        let mut stmt = conn
            .prepare(
                "SELECT contenthash, course_id, course_code, state FROM course_to_file
                 WHERE contenthash = ?1 ORDER BY id",
            )
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([contenthash], |row| {
                let code: i64 = row.get("state")?;
                Ok((
                    row.get::<_, String>("contenthash")?,
                    row.get::<_, i64>("course_id")?,
                    row.get::<_, String>("course_code")?,
                    code,
                ))
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        // The CHECK constraint keeps unknown states out; skip them if one slips in
        Ok(rows
            .into_iter()
            .filter_map(|(contenthash, course_id, course_code, code)| {
                OverrideState::from_code(code).map(|state| CourseOverride {
                    contenthash,
                    course_id,
                    course_code,
                    state,
                })
            })
            .collect())
    }
}

fn row_to_course(row: &Row<'_>) -> rusqlite::Result<LmsCourse> {
    Ok(LmsCourse {
        id: row.get("id")?,
        fullname: row.get("fullname")?,
        shortname: row.get("shortname")?,
        summary: row.get("summary")?,
        format: row.get("format")?,
        language: row.get("language")?,
        visible: row.get("visible")?,
        lecturers: json_column(row, "lecturers")?,
        customfields: json_column(row, "customfields")?,
    })
}

/// `UsageLookup` over the `file_usage` table
pub struct SqliteUsageLookup<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteUsageLookup<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl UsageLookup for SqliteUsageLookup<'_> {
    fn courses_using(&self, contenthash: &str) -> ExResult<BTreeSet<i64>> {
        CourseRepo::courses_using(self.conn, contenthash)
    }
}
