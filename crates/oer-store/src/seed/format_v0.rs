//! Seed Format v0 schema
//!
//! Describes the host LMS data the engine reads: courses, the files they
//! use, external resources and per-file course overrides.

use oer_core::model::{CustomFieldValue, Information, OverrideState};
use serde::{Deserialize, Serialize};

/// Top-level seed file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedV0 {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,

    #[serde(default)]
    pub courses: Vec<SeedCourse>,

    #[serde(default)]
    pub files: Vec<SeedFile>,

    #[serde(default)]
    pub externals: Vec<SeedExternal>,

    #[serde(default)]
    pub overrides: Vec<SeedOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCourse {
    pub id: i64,
    pub fullname: String,
    #[serde(default)]
    pub shortname: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub language: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub lecturers: Vec<String>,
    #[serde(default)]
    pub customfields: Vec<CustomFieldValue>,
}

fn default_visible() -> bool {
    true
}

/// A stored file used by a course module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedFile {
    pub contenthash: String,
    pub course_id: i64,
    /// Source plugin key, e.g. `mod_resource` or `mod_folder`
    #[serde(default = "default_component")]
    pub component: String,
    pub filename: String,
    pub mimetype: String,
    #[serde(default)]
    pub filesize: i64,
    #[serde(default)]
    pub timecreated: i64,
    #[serde(default = "default_license")]
    pub license: String,
    #[serde(default)]
    pub author: String,
}

fn default_component() -> String {
    "mod_resource".to_string()
}

fn default_license() -> String {
    oer_core::model::license::UNKNOWN_LICENSE.to_string()
}

/// A resource outside the LMS
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedExternal {
    pub course_id: i64,
    /// Source plugin key
    pub origin: String,
    /// Identifier value (ASCII alphanumeric)
    pub value: String,
    pub title: String,
    pub url: String,
    #[serde(default = "default_license")]
    pub license: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub information: Vec<Information>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedOverrideState {
    Include,
    Exclude,
}

impl From<SeedOverrideState> for OverrideState {
    fn from(state: SeedOverrideState) -> Self {
        match state {
            SeedOverrideState::Include => OverrideState::Include,
            SeedOverrideState::Exclude => OverrideState::Exclude,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedOverride {
    pub contenthash: String,
    pub course_id: i64,
    pub course_code: String,
    pub state: SeedOverrideState,
}
