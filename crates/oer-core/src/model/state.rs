use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Editorial lifecycle of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditState {
    NotEdited,
    Edited,
    Released,
}

impl EditState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditState::NotEdited => "not_edited",
            EditState::Edited => "edited",
            EditState::Released => "released",
        }
    }
}

/// A course that uses an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMembership {
    pub name: String,
    pub is_editor: bool,
}

/// Resolved state of one element as seen from one course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    pub state: EditState,
    /// 0 when no course owns the metadata yet
    pub editor_course_id: i64,
    pub courses: BTreeMap<i64, CourseMembership>,
    pub writable: bool,
}

impl ElementState {
    pub fn has_editor(&self) -> bool {
        self.editor_course_id != 0
    }

    /// Course ids flagged as editor; never more than one in a resolved state
    pub fn editor_courses(&self) -> impl Iterator<Item = i64> + '_ {
        self.courses
            .iter()
            .filter(|(_, m)| m.is_editor)
            .map(|(id, _)| *id)
    }
}
