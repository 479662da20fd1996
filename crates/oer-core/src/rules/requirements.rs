//! Release requirements.

use std::collections::BTreeMap;

use crate::config::RequiredField;
use crate::model::license::UNKNOWN_LICENSE;
use crate::model::{License, StoredMetadata};

/// Outcome of checking one record against the requirement set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementsResult {
    /// Requirement key -> satisfied
    pub fields: BTreeMap<String, bool>,
    pub releasable: bool,
    /// Releasable and flagged for release
    pub should_release: bool,
}

impl RequirementsResult {
    pub fn missing(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

/// Open licenses pass; an absent or unknown license never blocks.
pub fn license_acceptable(shortname: &str) -> bool {
    shortname.is_empty() || shortname == UNKNOWN_LICENSE || License::is_open(shortname)
}

pub fn evaluate(record: &StoredMetadata, required: &[RequiredField]) -> RequirementsResult {
    let mut fields = BTreeMap::new();
    fields.insert("title".to_string(), !record.title.trim().is_empty());
    fields.insert("license".to_string(), license_acceptable(&record.license));
    fields.insert("persons".to_string(), !record.persons.is_empty());

    for field in required {
        fields.insert(field.key(), satisfied(record, field));
    }

    let releasable = fields.values().all(|ok| *ok);
    RequirementsResult {
        fields,
        releasable,
        should_release: releasable && record.is_flagged_for_release(),
    }
}

fn satisfied(record: &StoredMetadata, field: &RequiredField) -> bool {
    match field {
        RequiredField::Description => !record.description.trim().is_empty(),
        RequiredField::Context => record.context > 0,
        RequiredField::Tags => !record.tag_list().is_empty(),
        RequiredField::Language => {
            let lang = record.language.trim();
            !lang.is_empty() && lang != "none"
        }
        RequiredField::Resourcetype => record.resourcetype > 0,
        RequiredField::Classification(plugin) => record
            .classification
            .get(plugin)
            .map(has_content)
            .unwrap_or(false),
    }
}

fn has_content(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::String(s) => !s.trim().is_empty(),
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}
