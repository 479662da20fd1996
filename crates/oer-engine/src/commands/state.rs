//! Element state resolution against the store.
//!
//! Gathers usage, stored metadata and release facts, runs the pure resolver
//! and persists a self-heal when the stored editor course no longer uses the
//! element.

#![allow(clippy::result_large_err)]

use std::collections::BTreeSet;

use oer_core::errors::{ExError, ExErrorKind};
use oer_core::model::{Element, ElementState, ElementType};
use oer_core::plugin::UsageLookup;
use oer_core::rules::{resolve_state, StateInputs};
use oer_core::{log_audit, RequestContext};
use oer_store::errors::Result;
use oer_store::repo::{AuditRepo, CourseRepo, MetadataRepo, SqliteUsageLookup};
use oer_store::snapshot::has_snapshot;
use rusqlite::Connection;

pub const RESOLVE_OP: &str = "resolve_state";

/// Resolve `element` as seen from `course_id`, healing a stale editor.
///
/// ## Errors
///
/// - `ContractViolation`: a file element no course uses
/// - `Persistence`: store access failed
pub fn resolve_element_state(
    conn: &Connection,
    ctx: &RequestContext,
    element: &Element,
    course_id: i64,
) -> Result<ElementState> {
    let identifier = element.identifier();
    let file_usage = match (element.element_type(), element.contenthash()) {
        (ElementType::MoodleFile, Some(hash)) => SqliteUsageLookup::new(conn).courses_using(hash)?,
        _ => BTreeSet::new(),
    };
    let stored = MetadataRepo::get_by_identifier(conn, identifier)?;

    let mut known: BTreeSet<i64> = file_usage.clone();
    known.insert(course_id);
    known.extend(stored.as_ref().map(|r| r.course_id));

    let inputs = StateInputs {
        current_course_id: course_id,
        file_usage,
        stored_editor: stored.as_ref().map(|r| r.course_id),
        released: has_snapshot(conn, identifier)?,
        course_names: CourseRepo::course_names(conn, &known)?,
    };

    let resolution = resolve_state(element, &inputs).map_err(|e| {
        ExError::from(e)
            .with_op(RESOLVE_OP)
            .with_identifier(identifier)
            .with_course_id(course_id)
    })?;

    if let Some(moved) = resolution.reassigned {
        MetadataRepo::move_to_course(conn, identifier, moved.to)?;
        let healed = ExError::new(ExErrorKind::InconsistentState)
            .with_op(RESOLVE_OP)
            .with_identifier(identifier)
            .with_course_id(moved.to)
            .with_message(format!(
                "editor course {} no longer uses the element, reassigned to course {}",
                moved.from, moved.to
            ));
        AuditRepo::record(
            conn,
            "ERROR",
            RESOLVE_OP,
            Some(identifier),
            Some(moved.to),
            &healed.to_string(),
        )?;
        log_audit!(
            RESOLVE_OP,
            healed.message(),
            identifier = identifier,
            err_code = healed.code(),
            from_course = moved.from,
            to_course = moved.to,
            request_id = %ctx.correlation.request_id
        );
    }

    Ok(resolution.state)
}
