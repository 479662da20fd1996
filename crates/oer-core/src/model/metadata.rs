use serde::{Deserialize, Serialize};

use crate::errors::{OerError, Result};

/// Release flag of a stored metadata record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReleaseState {
    #[default]
    None,
    Release,
    Ignore,
}

impl ReleaseState {
    pub fn code(&self) -> i64 {
        match self {
            ReleaseState::None => 0,
            ReleaseState::Release => 1,
            ReleaseState::Ignore => 2,
        }
    }

    /// # Errors
    ///
    /// `ContractViolation` for codes outside 0..=2.
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(ReleaseState::None),
            1 => Ok(ReleaseState::Release),
            2 => Ok(ReleaseState::Ignore),
            other => Err(OerError::ContractViolation {
                message: format!("release state out of range: {}", other),
            }),
        }
    }
}

/// Editor-maintained metadata of one element, owned by its editor course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMetadata {
    pub id: i64,
    pub course_id: i64,
    pub identifier: String,
    pub title: String,
    pub description: String,
    pub license: String,
    pub context: i64,
    pub language: String,
    pub resourcetype: i64,
    /// Comma-delimited tag list
    pub tags: String,
    pub persons: Vec<super::element::Person>,
    /// Classification values keyed by classification plugin
    pub classification: serde_json::Value,
    pub release_state: ReleaseState,
    pub user_modified: i64,
    pub time_created: i64,
    pub time_modified: i64,
}

impl StoredMetadata {
    /// A fresh record for `identifier`, pre-filled from nothing
    pub fn new(course_id: i64, identifier: impl Into<String>) -> Self {
        Self {
            id: 0,
            course_id,
            identifier: identifier.into(),
            title: String::new(),
            description: String::new(),
            license: super::license::UNKNOWN_LICENSE.to_string(),
            context: 0,
            language: String::new(),
            resourcetype: 0,
            tags: String::new(),
            persons: Vec::new(),
            classification: serde_json::Value::Object(serde_json::Map::new()),
            release_state: ReleaseState::None,
            user_modified: 0,
            time_created: 0,
            time_modified: 0,
        }
    }

    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn is_flagged_for_release(&self) -> bool {
        self.release_state == ReleaseState::Release
    }
}

/// Fields an editor may change through the edit operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub license: Option<String>,
    pub context: Option<i64>,
    pub language: Option<String>,
    pub resourcetype: Option<i64>,
    pub tags: Option<String>,
    pub persons: Option<Vec<super::element::Person>>,
    pub classification: Option<serde_json::Value>,
    pub release_state: Option<ReleaseState>,
}

impl MetadataEdit {
    /// Apply every set field onto `record`
    pub fn apply_to(&self, record: &mut StoredMetadata) {
        if let Some(v) = &self.title {
            record.title = v.clone();
        }
        if let Some(v) = &self.description {
            record.description = v.clone();
        }
        if let Some(v) = &self.license {
            record.license = v.clone();
        }
        if let Some(v) = self.context {
            record.context = v;
        }
        if let Some(v) = &self.language {
            record.language = v.clone();
        }
        if let Some(v) = self.resourcetype {
            record.resourcetype = v;
        }
        if let Some(v) = &self.tags {
            record.tags = v.clone();
        }
        if let Some(v) = &self.persons {
            record.persons = v.clone();
        }
        if let Some(v) = &self.classification {
            record.classification = v.clone();
        }
        if let Some(v) = self.release_state {
            record.release_state = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_list_skips_blanks() {
        let mut m = StoredMetadata::new(1, "oer:a@b:c:d:e");
        m.tags = "physics, ,optics,".into();
        assert_eq!(m.tag_list(), vec!["physics", "optics"]);
    }

    #[test]
    fn test_release_state_codes() {
        for state in [ReleaseState::None, ReleaseState::Release, ReleaseState::Ignore] {
            assert_eq!(ReleaseState::from_code(state.code()).unwrap(), state);
        }
        assert!(ReleaseState::from_code(3).is_err());
    }

    #[test]
    fn test_edit_applies_only_set_fields() {
        let mut m = StoredMetadata::new(1, "oer:a@b:c:d:e");
        m.title = "Old".into();
        m.language = "de".into();
        let edit = MetadataEdit {
            title: Some("New".into()),
            ..Default::default()
        };
        edit.apply_to(&mut m);
        assert_eq!(m.title, "New");
        assert_eq!(m.language, "de");
    }
}
