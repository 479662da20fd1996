//! Element state resolution.
//!
//! Given what the store knows about an element (who uses it, whether it has
//! stored metadata, whether it was ever released) this decides its
//! lifecycle state, its single editor course and whether the current course
//! may write. Pure: persistence of a self-heal is left to the caller.

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{OerError, Result};
use crate::model::{CourseMembership, EditState, Element, ElementState, ElementType};

/// Facts about one element gathered from storage
#[derive(Debug, Clone, Default)]
pub struct StateInputs {
    /// Course viewing the element
    pub current_course_id: i64,
    /// Courses referencing the file's content hash (files only)
    pub file_usage: BTreeSet<i64>,
    /// Course of the existing stored metadata record, if any
    pub stored_editor: Option<i64>,
    /// Whether any snapshot exists for the identifier
    pub released: bool,
    /// Display names of courses
    pub course_names: BTreeMap<i64, String>,
}

/// An editor course that no longer uses the element, and its replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorReassignment {
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub state: ElementState,
    pub reassigned: Option<EditorReassignment>,
}

/// Courses an element is considered to live in.
///
/// # Errors
///
/// `EmptyUsage` for a file element nobody references.
pub fn usage_set(element: &Element, inputs: &StateInputs) -> Result<BTreeSet<i64>> {
    match element.element_type() {
        ElementType::MoodleFile => {
            if inputs.file_usage.is_empty() {
                return Err(OerError::EmptyUsage {
                    identifier: element.identifier().to_string(),
                });
            }
            Ok(inputs.file_usage.clone())
        }
        ElementType::External => {
            let mut usage = BTreeSet::from([inputs.current_course_id]);
            usage.extend(inputs.stored_editor);
            Ok(usage)
        }
    }
}

/// Resolve the state of `element` as seen from `inputs.current_course_id`.
///
/// An editor course outside the usage set is replaced by the lowest course
/// id of the set and reported in `Resolution::reassigned`.
///
/// # Errors
///
/// `EmptyUsage` for a file element nobody references.
pub fn resolve(element: &Element, inputs: &StateInputs) -> Result<Resolution> {
    let usage = usage_set(element, inputs)?;

    let mut reassigned = None;
    let editor = match inputs.stored_editor {
        Some(editor) if usage.contains(&editor) => editor,
        Some(stale) => {
            // usage is never empty here
            let to = usage.iter().next().copied().unwrap_or(inputs.current_course_id);
            reassigned = Some(EditorReassignment { from: stale, to });
            to
        }
        None => 0,
    };

    let state = if inputs.released {
        EditState::Released
    } else if editor != 0 {
        EditState::Edited
    } else {
        EditState::NotEdited
    };

    let writable = match state {
        EditState::Released => false,
        EditState::NotEdited => true,
        EditState::Edited => inputs.current_course_id == editor,
    };

    let courses = usage
        .iter()
        .map(|id| {
            let name = inputs.course_names.get(id).cloned().unwrap_or_default();
            (
                *id,
                CourseMembership {
                    name,
                    is_editor: *id == editor,
                },
            )
        })
        .collect();

    Ok(Resolution {
        state: ElementState {
            state,
            editor_course_id: editor,
            courses,
            writable,
        },
        reassigned,
    })
}
