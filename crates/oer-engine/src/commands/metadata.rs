//! Interactive metadata editing.
//!
//! Edits are accepted only from the element's editor course (or any course
//! while nobody owns it). Concurrent edits of the same record are not
//! versioned: the last writer wins.

#![allow(clippy::result_large_err)]

use oer_core::errors::{ExError, OerError};
use oer_core::model::license::UNKNOWN_LICENSE;
use oer_core::model::{Element, MetadataEdit, ReleaseState, StoredMetadata};
use oer_core::rules::evaluate_requirements;
use oer_core::RequestContext;
use oer_store::errors::Result;
use oer_store::repo::MetadataRepo;
use rusqlite::Connection;

use super::state::resolve_element_state;

const EDIT_OP: &str = "edit_metadata";

fn invalid(field: &str, reason: impl Into<String>) -> ExError {
    ExError::from(OerError::InvalidField {
        field: field.to_string(),
        reason: reason.into(),
    })
    .with_op(EDIT_OP)
}

/// Field-level checks that need no stored state
pub fn validate_edit(edit: &MetadataEdit, ctx: &RequestContext) -> Result<()> {
    if let Some(title) = &edit.title {
        if title.trim().is_empty() {
            return Err(invalid("title", "must not be empty"));
        }
    }
    if let Some(license) = &edit.license {
        if license != UNKNOWN_LICENSE && !ctx.licenses.contains(license) {
            return Err(invalid("license", format!("unknown license '{}'", license)));
        }
    }
    if edit.context.is_some_and(|c| c < 0) {
        return Err(invalid("context", "must not be negative"));
    }
    if edit.resourcetype.is_some_and(|r| r < 0) {
        return Err(invalid("resourcetype", "must not be negative"));
    }
    if let Some(persons) = &edit.persons {
        if persons
            .iter()
            .any(|p| p.role.trim().is_empty() || p.name.trim().is_empty())
        {
            return Err(invalid("persons", "every person needs a role and a name"));
        }
    }
    if let Some(classification) = &edit.classification {
        if !classification.is_object() {
            return Err(invalid("classification", "must be an object keyed by plugin"));
        }
    }
    Ok(())
}

/// A new record pre-filled from the element as its source plugin sees it
fn seed_record(element: &Element, course_id: i64) -> StoredMetadata {
    let mut record = StoredMetadata::new(course_id, element.identifier());
    record.title = element.title().to_string();
    record.license = element.license().to_string();
    record.persons = element.people().to_vec();
    record
}

/// Apply `edit` to the metadata of `element` on behalf of `course_id`.
///
/// ## Errors
///
/// - `NotWritable`: another course owns the metadata or the element was released
/// - `InvalidField`: a submitted value was rejected; a release flag is
///   rejected while requirements are missing
/// - `Persistence`: store access failed
pub fn edit_metadata(
    conn: &Connection,
    ctx: &RequestContext,
    element: &Element,
    course_id: i64,
    edit: &MetadataEdit,
) -> Result<StoredMetadata> {
    let state = resolve_element_state(conn, ctx, element, course_id)?;
    if !state.writable {
        return Err(ExError::from(OerError::NotWritable {
            identifier: element.identifier().to_string(),
            course_id,
        })
        .with_op(EDIT_OP));
    }

    validate_edit(edit, ctx)?;

    let existing = MetadataRepo::get_by_identifier(conn, element.identifier())?;
    let mut record = existing
        .clone()
        .unwrap_or_else(|| seed_record(element, course_id));
    edit.apply_to(&mut record);
    record.user_modified = ctx.current_user_id;

    if record.release_state == ReleaseState::Release {
        let result = evaluate_requirements(&record, &ctx.config.required_fields());
        if !result.releasable {
            return Err(invalid(
                "release_state",
                format!("requirements missing: {}", result.missing().join(", ")),
            )
            .with_identifier(element.identifier()));
        }
    }

    match existing {
        Some(_) => MetadataRepo::update(conn, &record)?,
        None => {
            record.id = MetadataRepo::insert(conn, &record)?;
        }
    }

    tracing::info!(
        op = EDIT_OP,
        identifier = element.identifier(),
        course_id,
        user_id = ctx.current_user_id,
        "Metadata saved"
    );

    Ok(MetadataRepo::get_by_identifier(conn, element.identifier())?.unwrap_or(record))
}
