//! Course metadata synchronisation planning.
//!
//! Compares the stored course-info rows of one course with a fresh scan and
//! produces the rows to create, update and delete. Fields an editor changed
//! (`*_edited`) are never overwritten by the scan.

use std::collections::BTreeMap;

use crate::config::OerConfig;
use crate::errors::Result;
use crate::model::courseinfo::{base_course_code, BASE_SUBPLUGIN};
use crate::model::{CourseInfo, CourseInfoField, CustomFieldValue, LmsCourse};
use crate::snapshot::digest::digest_json;

/// Changes needed to bring stored course info in line with a scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPlan {
    pub create: Vec<CourseInfo>,
    /// Stored rows with fresh values merged in; ids preserved
    pub update: Vec<CourseInfo>,
    /// Row ids to remove
    pub hard_delete: Vec<i64>,
    /// Row ids to flag `deleted` and `ignored`
    pub soft_delete: Vec<i64>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty()
            && self.update.is_empty()
            && self.hard_delete.is_empty()
            && self.soft_delete.is_empty()
    }
}

/// Custom fields of a course that configuration allows into course metadata
pub fn filter_customfields(
    fields: &[CustomFieldValue],
    config: &OerConfig,
) -> Option<serde_json::Value> {
    if !config.course_customfields {
        return None;
    }
    let kept: Vec<&CustomFieldValue> = fields
        .iter()
        .filter(|f| f.visibility >= config.customfield_visibility)
        .filter(|f| !is_ignored(f, &config.customfield_ignore))
        .filter(|f| !f.value.trim().is_empty())
        .collect();
    if kept.is_empty() {
        return None;
    }
    serde_json::to_value(kept).ok()
}

fn is_ignored(field: &CustomFieldValue, ignore: &[String]) -> bool {
    ignore.iter().any(|entry| match entry.split_once(':') {
        Some((category, shortname)) => category == field.category && shortname == field.shortname,
        None => entry == &field.shortname,
    })
}

/// The native course-info entry computed from the LMS course record
pub fn base_entry(course: &LmsCourse, config: &OerConfig) -> CourseInfo {
    let mut info = CourseInfo::new(course.id, base_course_code(course.id), BASE_SUBPLUGIN);
    info.coursename = course.fullname.clone();
    info.structure = course.format.clone();
    info.description = course.summary.clone();
    info.language = course.language.clone();
    info.lecturer = course.lecturers.join(", ");
    info.customfields = filter_customfields(&course.customfields, config);
    info
}

fn customfield_hash(value: &Option<serde_json::Value>) -> Result<Option<String>> {
    value.as_ref().map(digest_json).transpose()
}

/// Plan the sync of one course.
///
/// # Errors
///
/// `Serialization` if custom fields cannot be hashed.
pub fn plan(stored: &[CourseInfo], fresh: &[CourseInfo]) -> Result<SyncPlan> {
    let stored_by_code: BTreeMap<&str, &CourseInfo> =
        stored.iter().map(|s| (s.course_code.as_str(), s)).collect();
    let fresh_by_code: BTreeMap<&str, &CourseInfo> =
        fresh.iter().map(|f| (f.course_code.as_str(), f)).collect();

    let mut result = SyncPlan::default();

    for entry in fresh {
        match stored_by_code.get(entry.course_code.as_str()) {
            None => result.create.push(entry.clone()),
            Some(existing) => {
                if let Some(updated) = merge(existing, entry)? {
                    result.update.push(updated);
                }
            }
        }
    }

    for existing in stored {
        if fresh_by_code.contains_key(existing.course_code.as_str()) {
            continue;
        }
        if !existing.has_edits() {
            result.hard_delete.push(existing.id);
        } else if !(existing.deleted && existing.ignored) {
            result.soft_delete.push(existing.id);
        }
    }

    Ok(result)
}

/// Merge a fresh entry into its stored row; `None` if nothing changes.
fn merge(existing: &CourseInfo, fresh: &CourseInfo) -> Result<Option<CourseInfo>> {
    let mut changed = existing.deleted;
    let mut merged = existing.clone();

    for field in CourseInfoField::ALL {
        if existing.is_edited(field) {
            continue;
        }
        if existing.get(field) != fresh.get(field) {
            merged.set(field, fresh.get(field));
            changed = true;
        }
    }

    if customfield_hash(&existing.customfields)? != customfield_hash(&fresh.customfields)? {
        merged.customfields = fresh.customfields.clone();
        changed = true;
    }

    if !changed {
        return Ok(None);
    }

    merged.subplugin = fresh.subplugin.clone();
    merged.external_course_id = fresh.external_course_id;
    merged.external_source_id = fresh.external_source_id;
    if existing.deleted {
        merged.deleted = false;
        merged.ignored = false;
    }
    Ok(Some(merged))
}
