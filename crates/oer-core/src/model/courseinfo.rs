use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Subplugin name of course info computed from the LMS course itself
pub const BASE_SUBPLUGIN: &str = "base";

/// Course code of the native entry for `course_id`
pub fn base_course_code(course_id: i64) -> String {
    format!("moodlecourse-{}", course_id)
}

/// Course-info fields an editor can override
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseInfoField {
    Coursename,
    Structure,
    Description,
    Objectives,
    Organisation,
    Language,
    Lecturer,
}

impl CourseInfoField {
    pub const ALL: [CourseInfoField; 7] = [
        CourseInfoField::Coursename,
        CourseInfoField::Structure,
        CourseInfoField::Description,
        CourseInfoField::Objectives,
        CourseInfoField::Organisation,
        CourseInfoField::Language,
        CourseInfoField::Lecturer,
    ];

    /// Column name in storage
    pub fn column(&self) -> &'static str {
        match self {
            CourseInfoField::Coursename => "coursename",
            CourseInfoField::Structure => "structure",
            CourseInfoField::Description => "description",
            CourseInfoField::Objectives => "objectives",
            CourseInfoField::Organisation => "organisation",
            CourseInfoField::Language => "language",
            CourseInfoField::Lecturer => "lecturer",
        }
    }
}

/// Descriptive metadata for one course code of one course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseInfo {
    pub id: i64,
    pub course_id: i64,
    pub course_code: String,
    pub subplugin: String,
    pub external_course_id: i64,
    pub external_source_id: i64,
    pub coursename: String,
    pub structure: String,
    pub description: String,
    pub objectives: String,
    pub organisation: String,
    pub language: String,
    pub lecturer: String,
    pub edited: BTreeSet<CourseInfoField>,
    pub customfields: Option<serde_json::Value>,
    pub deleted: bool,
    pub ignored: bool,
    pub time_created: i64,
    pub time_modified: i64,
}

impl CourseInfo {
    pub fn new(course_id: i64, course_code: impl Into<String>, subplugin: impl Into<String>) -> Self {
        Self {
            id: 0,
            course_id,
            course_code: course_code.into(),
            subplugin: subplugin.into(),
            external_course_id: 0,
            external_source_id: 0,
            coursename: String::new(),
            structure: String::new(),
            description: String::new(),
            objectives: String::new(),
            organisation: String::new(),
            language: String::new(),
            lecturer: String::new(),
            edited: BTreeSet::new(),
            customfields: None,
            deleted: false,
            ignored: false,
            time_created: 0,
            time_modified: 0,
        }
    }

    pub fn get(&self, field: CourseInfoField) -> &str {
        match field {
            CourseInfoField::Coursename => &self.coursename,
            CourseInfoField::Structure => &self.structure,
            CourseInfoField::Description => &self.description,
            CourseInfoField::Objectives => &self.objectives,
            CourseInfoField::Organisation => &self.organisation,
            CourseInfoField::Language => &self.language,
            CourseInfoField::Lecturer => &self.lecturer,
        }
    }

    pub fn set(&mut self, field: CourseInfoField, value: impl Into<String>) {
        let value = value.into();
        match field {
            CourseInfoField::Coursename => self.coursename = value,
            CourseInfoField::Structure => self.structure = value,
            CourseInfoField::Description => self.description = value,
            CourseInfoField::Objectives => self.objectives = value,
            CourseInfoField::Organisation => self.organisation = value,
            CourseInfoField::Language => self.language = value,
            CourseInfoField::Lecturer => self.lecturer = value,
        }
    }

    pub fn is_edited(&self, field: CourseInfoField) -> bool {
        self.edited.contains(&field)
    }

    pub fn has_edits(&self) -> bool {
        !self.edited.is_empty()
    }

    /// Not deleted and not ignored
    pub fn is_active(&self) -> bool {
        !self.deleted && !self.ignored
    }

    pub fn is_base(&self) -> bool {
        self.subplugin == BASE_SUBPLUGIN
    }
}

/// A custom field value attached to an LMS course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldValue {
    pub shortname: String,
    pub category: String,
    /// 0 nobody, 1 teachers, 2 everyone
    pub visibility: i64,
    pub value: String,
}

/// A course of the host LMS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LmsCourse {
    pub id: i64,
    pub fullname: String,
    pub shortname: String,
    pub summary: String,
    pub format: String,
    pub language: String,
    pub visible: bool,
    pub lecturers: Vec<String>,
    pub customfields: Vec<CustomFieldValue>,
}

/// Per-file decision to add or drop a course's metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverrideState {
    Include,
    Exclude,
}

impl OverrideState {
    pub fn code(&self) -> i64 {
        match self {
            OverrideState::Include => 1,
            OverrideState::Exclude => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(OverrideState::Include),
            2 => Some(OverrideState::Exclude),
            _ => None,
        }
    }
}

/// A `course_to_file` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOverride {
    pub contenthash: String,
    pub course_id: i64,
    pub course_code: String,
    pub state: OverrideState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_access() {
        let mut info = CourseInfo::new(5, base_course_code(5), BASE_SUBPLUGIN);
        for field in CourseInfoField::ALL {
            info.set(field, field.column());
        }
        for field in CourseInfoField::ALL {
            assert_eq!(info.get(field), field.column());
        }
        assert_eq!(info.course_code, "moodlecourse-5");
        assert!(info.is_base());
        assert!(info.is_active());
    }
}
