use serde::{Deserialize, Serialize};

use super::element::{ElementType, Person};

/// One immutable row of the snapshot ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: i64,
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
    pub classification: serde_json::Value,
    pub course_metadata: serde_json::Value,
    pub additional_data: serde_json::Value,
    pub element_type: ElementType,
    pub type_data: serde_json::Value,
    pub release_hash: String,
    pub release_number: i64,
    pub time_created: i64,
}

impl SnapshotRecord {
    /// Ordering key used to pick the latest row of an identifier
    pub fn recency(&self) -> (i64, i64) {
        (self.time_created, self.id)
    }
}
