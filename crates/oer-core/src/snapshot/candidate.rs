//! Snapshot candidates: everything that goes into one release row.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::errors::Result;
use crate::model::{
    CourseInfo, CourseOverride, Element, ElementType, OverrideState, Person, StoredMetadata,
};
use crate::snapshot::digest::release_hash;

/// Content of a snapshot before it is hashed and numbered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotCandidate {
    pub course_id: i64,
    pub identifier: String,
    pub title: String,
    pub description: String,
    pub context: i64,
    pub license: String,
    pub persons: Vec<Person>,
    pub tags: String,
    pub language: String,
    pub resourcetype: i64,
    pub classification: Value,
    pub course_metadata: Value,
    pub additional_data: Value,
    pub element_type: ElementType,
    pub type_data: Value,
}

impl SnapshotCandidate {
    pub fn build(
        element: &Element,
        record: &StoredMetadata,
        course_metadata: Value,
        additional_data: Value,
    ) -> Self {
        Self {
            course_id: record.course_id,
            identifier: element.identifier().to_string(),
            title: record.title.clone(),
            description: record.description.clone(),
            context: record.context,
            license: record.license.clone(),
            persons: record.persons.clone(),
            tags: record.tags.clone(),
            language: record.language.clone(),
            resourcetype: record.resourcetype,
            classification: record.classification.clone(),
            course_metadata,
            additional_data,
            element_type: element.element_type(),
            type_data: type_data(element),
        }
    }

    /// # Errors
    ///
    /// `OerError::Serialization` if hashing fails.
    pub fn hash(&self) -> Result<String> {
        release_hash(self)
    }
}

/// Type-specific release data.
///
/// Files carry technical file facts; external elements carry every
/// information entry that names a metadata field.
pub fn type_data(element: &Element) -> Value {
    match element.element_type() {
        ElementType::MoodleFile => json!({
            "mimetype": element.mimetype().unwrap_or_default(),
            "filesize": element.filesize().unwrap_or_default(),
            "filecreationtime": element.stored_file().map(|f| f.timecreated).unwrap_or_default(),
            "source": element.source(),
        }),
        ElementType::External => {
            let fields: Map<String, Value> = element
                .information()
                .iter()
                .filter_map(|info| {
                    info.metadata_field
                        .as_ref()
                        .map(|field| (field.clone(), info.raw_data.clone()))
                })
                .collect();
            Value::Object(fields)
        }
    }
}

pub fn course_info_json(info: &CourseInfo) -> Value {
    let mut value = json!({
        "courseid": info.course_id,
        "coursecode": info.course_code,
        "subplugin": info.subplugin,
        "coursename": info.coursename,
        "structure": info.structure,
        "description": info.description,
        "objectives": info.objectives,
        "organisation": info.organisation,
        "language": info.language,
        "lecturer": info.lecturer,
    });
    if let (Some(custom), Some(map)) = (&info.customfields, value.as_object_mut()) {
        map.insert("customfields".to_string(), custom.clone());
    }
    value
}

/// Course metadata attached to an element's snapshot.
///
/// Starts from the releasing course's active entries, then applies the
/// element's `course_to_file` overrides: an include adds the matching entry
/// of the other course, an exclude drops every entry with that course code.
pub fn course_metadata_bundle(
    own: &[CourseInfo],
    overrides: &[CourseOverride],
    available: &BTreeMap<i64, Vec<CourseInfo>>,
) -> Value {
    let mut entries: Vec<&CourseInfo> = own.iter().filter(|i| i.is_active()).collect();

    for rule in overrides.iter().filter(|o| o.state == OverrideState::Include) {
        let extra = available
            .get(&rule.course_id)
            .into_iter()
            .flatten()
            .filter(|i| i.is_active() && i.course_code == rule.course_code);
        for info in extra {
            if !entries.iter().any(|e| e.course_code == info.course_code) {
                entries.push(info);
            }
        }
    }

    for rule in overrides.iter().filter(|o| o.state == OverrideState::Exclude) {
        entries.retain(|e| e.course_code != rule.course_code);
    }

    Value::Array(entries.into_iter().map(course_info_json).collect())
}
