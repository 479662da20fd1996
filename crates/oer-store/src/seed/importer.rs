//! Seed importer orchestration
//!
//! Writes a validated seed into the host-data tables inside one transaction.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, json_error, Result};
use crate::repo::settings::SEED_DIGEST;
use crate::repo::{CourseRepo, ExternalRow, FileUsageRow, SettingsRepo};
use crate::seed::provenance::{emit, ProvenanceKind};
use crate::seed::{compute_seed_digest, parse_seed_file_with_db};
use oer_core::model::{CourseOverride, LmsCourse};
use oer_core::OerConfig;
use rusqlite::Connection;
use std::path::Path;

/// What an import wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub seed_digest: String,
    pub courses: usize,
    pub files: usize,
    pub externals: usize,
    pub overrides: usize,
    /// The same seed was already imported; nothing was written
    pub unchanged: bool,
}

/// Import a seed file into the database
///
/// 1. Parses and validates the seed (courses may already exist in the database)
/// 2. Computes the seed digest; a digest equal to the last import is a no-op
/// 3. Upserts courses, file usage, external elements and overrides
/// 4. Records provenance in the audit log and the digest in settings
pub fn import_seed(path: &Path, conn: &mut Connection, config: &OerConfig) -> Result<ImportReport> {
    let seed = parse_seed_file_with_db(path, config, Some(conn))?;
    let seed_digest = compute_seed_digest(&seed)?;

    if SettingsRepo::get(conn, SEED_DIGEST)?.as_deref() == Some(seed_digest.as_str()) {
        tracing::info!(seed_digest = %seed_digest, "Seed already imported");
        return Ok(ImportReport {
            seed_digest,
            unchanged: true,
            ..ImportReport::default()
        });
    }

    let tx = conn.transaction().map_err(from_rusqlite)?;
    emit(&tx, ProvenanceKind::ImportStarted, &seed_digest, None)?;

    for course in &seed.courses {
        CourseRepo::upsert_course(
            &tx,
            &LmsCourse {
                id: course.id,
                fullname: course.fullname.clone(),
                shortname: course.shortname.clone(),
                summary: course.summary.clone(),
                format: course.format.clone(),
                language: course.language.clone(),
                visible: course.visible,
                lecturers: course.lecturers.clone(),
                customfields: course.customfields.clone(),
            },
        )?;
        emit(&tx, ProvenanceKind::CourseApplied, &seed_digest, Some(course.id))?;
    }

    for file in &seed.files {
        CourseRepo::add_file_usage(
            &tx,
            &FileUsageRow {
                contenthash: file.contenthash.clone(),
                course_id: file.course_id,
                component: file.component.clone(),
                filename: file.filename.clone(),
                mimetype: file.mimetype.clone(),
                filesize: file.filesize,
                timecreated: file.timecreated,
                license: file.license.clone(),
                author: file.author.clone(),
            },
        )?;
    }

    for external in &seed.externals {
        let information = serde_json::to_value(&external.information)
            .map_err(|e| json_error("seed_import", e))?;
        CourseRepo::add_external(
            &tx,
            &ExternalRow {
                course_id: external.course_id,
                origin: external.origin.clone(),
                value: external.value.clone(),
                title: external.title.clone(),
                url: external.url.clone(),
                license: external.license.clone(),
                author: external.author.clone(),
                information,
            },
        )?;
    }

    for rule in &seed.overrides {
        CourseRepo::set_override(
            &tx,
            &CourseOverride {
                contenthash: rule.contenthash.clone(),
                course_id: rule.course_id,
                course_code: rule.course_code.clone(),
                state: rule.state.into(),
            },
            0,
        )?;
    }

    SettingsRepo::set(&tx, SEED_DIGEST, &seed_digest)?;
    emit(&tx, ProvenanceKind::ImportCompleted, &seed_digest, None)?;
    tx.commit().map_err(from_rusqlite)?;

    tracing::info!(
        seed_digest = %seed_digest,
        courses = seed.courses.len(),
        files = seed.files.len(),
        externals = seed.externals.len(),
        "Seed imported"
    );

    Ok(ImportReport {
        seed_digest,
        courses: seed.courses.len(),
        files: seed.files.len(),
        externals: seed.externals.len(),
        overrides: seed.overrides.len(),
        unchanged: false,
    })
}
