//! Course metadata synchronisation against the store.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use oer_core::errors::{ExError, ExErrorKind};
use oer_core::model::{CourseInfo, CourseInfoField};
use oer_core::rules::courseinfo_sync::base_entry;
use oer_core::rules::plan_courseinfo_sync;
use oer_core::{log_op_end, log_op_error, log_op_start, PluginRegistry, RequestContext};
use oer_store::errors::{from_rusqlite, Result};
use oer_store::repo::{CourseInfoRepo, CourseRepo};
use rusqlite::Connection;

const SYNC_OP: &str = "sync_courseinfo";

/// Counts of one course's sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub course_id: i64,
    pub created: usize,
    pub updated: usize,
    pub hard_deleted: usize,
    pub soft_deleted: usize,
}

/// Fresh course-info entries: the native one plus the provider's, if any
fn fresh_entries(
    conn: &Connection,
    registry: &PluginRegistry,
    ctx: &RequestContext,
    course_id: i64,
) -> Result<Vec<CourseInfo>> {
    let course = CourseRepo::get_course(conn, course_id)?.ok_or_else(|| {
        ExError::new(ExErrorKind::NotFound)
            .with_op(SYNC_OP)
            .with_course_id(course_id)
            .with_message("course not found")
    })?;

    let mut entries = vec![base_entry(&course, &ctx.config)];
    if let Some(provider) = registry.course_info_provider() {
        if let Some(mut extra) = provider.course_info(course_id)? {
            extra.course_id = course_id;
            if extra.subplugin.is_empty() {
                extra.subplugin = provider.key().to_string();
            }
            entries.push(extra);
        }
    }
    Ok(entries)
}

/// Bring the stored course info of one course in line with a fresh scan.
///
/// ## Errors
///
/// - `NotFound`: the course does not exist
/// - `ExternalService`: the course-info provider failed
/// - `Persistence`: store access failed
pub fn sync_course(
    conn: &mut Connection,
    registry: &PluginRegistry,
    ctx: &RequestContext,
    course_id: i64,
) -> Result<SyncReport> {
    let fresh = fresh_entries(conn, registry, ctx, course_id)?;
    let stored = CourseInfoRepo::list_for_course(conn, course_id)?;
    let plan = plan_courseinfo_sync(&stored, &fresh)
        .map_err(|e| ExError::from(e).with_op(SYNC_OP).with_course_id(course_id))?;

    let report = SyncReport {
        course_id,
        created: plan.create.len(),
        updated: plan.update.len(),
        hard_deleted: plan.hard_delete.len(),
        soft_deleted: plan.soft_delete.len(),
    };
    if plan.is_empty() {
        return Ok(report);
    }

    let tx = conn.transaction().map_err(from_rusqlite)?;
    for info in &plan.create {
        CourseInfoRepo::insert(&tx, info)?;
    }
    for info in &plan.update {
        CourseInfoRepo::update(&tx, info)?;
    }
    for id in &plan.hard_delete {
        CourseInfoRepo::delete(&tx, *id)?;
    }
    for id in &plan.soft_delete {
        CourseInfoRepo::soft_delete(&tx, *id)?;
    }
    tx.commit().map_err(from_rusqlite)?;

    tracing::info!(
        op = SYNC_OP,
        course_id,
        created = report.created,
        updated = report.updated,
        hard_deleted = report.hard_deleted,
        soft_deleted = report.soft_deleted,
        "Course info synchronised"
    );
    Ok(report)
}

/// Sync every known course; a failing course is logged and skipped.
pub fn sync_all_courses(
    conn: &mut Connection,
    registry: &PluginRegistry,
    ctx: &RequestContext,
) -> Result<Vec<SyncReport>> {
    let start = Instant::now();
    log_op_start!(SYNC_OP);

    let mut reports = Vec::new();
    for course in CourseRepo::list_courses(conn)? {
        match sync_course(conn, registry, ctx, course.id) {
            Ok(report) => reports.push(report),
            Err(err) if err.kind() != ExErrorKind::Persistence => {
                log_op_error!(
                    SYNC_OP,
                    err,
                    duration_ms = start.elapsed().as_millis() as u64,
                    course_id = course.id
                );
            }
            Err(err) => return Err(err),
        }
    }

    log_op_end!(SYNC_OP, duration_ms = start.elapsed().as_millis() as u64);
    Ok(reports)
}

/// Editor override of one course-info field, protected from later syncs
pub fn edit_courseinfo_field(
    conn: &Connection,
    ctx: &RequestContext,
    id: i64,
    field: CourseInfoField,
    value: &str,
) -> Result<CourseInfo> {
    CourseInfoRepo::edit_field(conn, id, field, value)?;
    tracing::info!(
        op = "courseinfo_edit_field",
        id,
        field = field.column(),
        user_id = ctx.current_user_id,
        "Course info field edited"
    );
    CourseInfoRepo::get(conn, id)?.ok_or_else(|| {
        ExError::new(ExErrorKind::NotFound)
            .with_op("courseinfo_edit_field")
            .with_message(format!("course info row {} not found", id))
    })
}

/// Exclude or re-include one course-info row from releases
pub fn set_courseinfo_ignored(conn: &Connection, id: i64, ignored: bool) -> Result<()> {
    CourseInfoRepo::set_ignored(conn, id, ignored)
}
