use serde::{Deserialize, Serialize};

use super::license::LicenseRegistry;
use super::state::ElementState;
use crate::errors::{OerError, Result};
use crate::identifier;

/// Kind of content an element stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// A file stored by the LMS, identified by its content hash
    MoodleFile,
    /// A resource living outside the LMS (external repository, URL, ...)
    External,
}

impl ElementType {
    /// Stable numeric code used in storage
    pub fn code(&self) -> i64 {
        match self {
            ElementType::MoodleFile => 1,
            ElementType::External => 2,
        }
    }

    /// # Errors
    ///
    /// `OerError::UnknownElementType` for any code other than 1 or 2.
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            1 => Ok(ElementType::MoodleFile),
            2 => Ok(ElementType::External),
            other => Err(OerError::UnknownElementType {
                value: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::MoodleFile => "moodlefile",
            ElementType::External => "external",
        }
    }
}

/// A person credited on an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub role: String,
    pub name: String,
}

/// A piece of descriptive information shown next to an element
///
/// Entries with `metadata_field` set are also carried into release
/// snapshots of external elements under that field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Information {
    pub area: String,
    pub name: String,
    pub url: Option<String>,
    pub raw_data: serde_json::Value,
    pub metadata_field: Option<String>,
}

impl Information {
    pub fn new(area: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            area: area.into(),
            name: name.into(),
            url: None,
            raw_data: serde_json::Value::Null,
            metadata_field: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_metadata(mut self, field: impl Into<String>, raw: serde_json::Value) -> Self {
        self.metadata_field = Some(field.into());
        self.raw_data = raw;
        self
    }
}

/// Reference to the stored binary behind a file element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFileRef {
    pub contenthash: String,
    pub filename: String,
    pub timecreated: i64,
}

/// One learning resource contributed by a source plugin
///
/// Required fields are set through validating setters; an element that
/// passed `validate_required` can be listed and released.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    element_type: ElementType,
    title: String,
    identifier: String,
    license: String,
    origins: Vec<String>,
    source: String,
    filesize: Option<u64>,
    mimetype: Option<String>,
    people: Vec<Person>,
    information: Vec<Information>,
    stored_file: Option<StoredFileRef>,
    state: Option<ElementState>,
}

impl Element {
    pub fn new(element_type: ElementType) -> Self {
        Self {
            element_type,
            title: String::new(),
            identifier: String::new(),
            license: super::license::UNKNOWN_LICENSE.to_string(),
            origins: Vec::new(),
            source: String::new(),
            filesize: None,
            mimetype: None,
            people: Vec::new(),
            information: Vec::new(),
            stored_file: None,
            state: None,
        }
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// # Errors
    ///
    /// `RequiredFieldEmpty` for an empty or whitespace-only title.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        self.title = non_empty("title", title.into())?;
        Ok(())
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// # Errors
    ///
    /// `RequiredFieldEmpty` when empty, `MalformedIdentifier` when it does not validate.
    pub fn set_identifier(&mut self, identifier: impl Into<String>) -> Result<()> {
        let identifier = non_empty("identifier", identifier.into())?;
        identifier::strict_validate(&identifier)?;
        self.identifier = identifier;
        Ok(())
    }

    pub fn license(&self) -> &str {
        &self.license
    }

    /// Unregistered shortnames are stored as `unknown`.
    pub fn set_license(&mut self, license: &str, registry: &LicenseRegistry) {
        self.license = registry.coerce(license);
    }

    /// Primary origin (the first source plugin that contributed the element)
    pub fn origin(&self) -> &str {
        self.origins.first().map(String::as_str).unwrap_or_default()
    }

    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    /// # Errors
    ///
    /// `RequiredFieldEmpty` for an empty origin.
    pub fn set_origin(&mut self, origin: impl Into<String>) -> Result<()> {
        let origin = non_empty("origin", origin.into())?;
        self.origins.retain(|o| o != &origin);
        self.origins.insert(0, origin);
        Ok(())
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// # Errors
    ///
    /// `RequiredFieldEmpty` for an empty source URL.
    pub fn set_source(&mut self, source: impl Into<String>) -> Result<()> {
        self.source = non_empty("source", source.into())?;
        Ok(())
    }

    pub fn filesize(&self) -> Option<u64> {
        self.filesize
    }

    pub fn set_filesize(&mut self, filesize: u64) {
        self.filesize = Some(filesize);
    }

    pub fn mimetype(&self) -> Option<&str> {
        self.mimetype.as_deref()
    }

    /// # Errors
    ///
    /// `RequiredFieldEmpty` for an empty mimetype.
    pub fn set_mimetype(&mut self, mimetype: impl Into<String>) -> Result<()> {
        self.mimetype = Some(non_empty("mimetype", mimetype.into())?);
        Ok(())
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn add_person(&mut self, role: impl Into<String>, name: impl Into<String>) {
        self.people.push(Person {
            role: role.into(),
            name: name.into(),
        });
    }

    pub fn information(&self) -> &[Information] {
        &self.information
    }

    /// Add an information entry unless one with the same area and name exists
    pub fn add_information(&mut self, info: Information) {
        let exists = self
            .information
            .iter()
            .any(|i| i.area == info.area && i.name == info.name);
        if !exists {
            self.information.push(info);
        }
    }

    pub fn stored_file(&self) -> Option<&StoredFileRef> {
        self.stored_file.as_ref()
    }

    pub fn set_stored_file(&mut self, file: StoredFileRef) {
        self.stored_file = Some(file);
    }

    /// Content hash of the underlying file, if this is a file element
    pub fn contenthash(&self) -> Option<&str> {
        match self.element_type {
            ElementType::MoodleFile => self.stored_file.as_ref().map(|f| f.contenthash.as_str()),
            ElementType::External => None,
        }
    }

    pub fn state(&self) -> Option<&ElementState> {
        self.state.as_ref()
    }

    pub fn set_state(&mut self, state: ElementState) {
        self.state = Some(state);
    }

    /// Fold a later duplicate's information and origins into this element
    pub fn absorb(&mut self, duplicate: Element) {
        for info in duplicate.information {
            self.add_information(info);
        }
        for origin in duplicate.origins {
            if !self.origins.contains(&origin) {
                self.origins.push(origin);
            }
        }
    }

    /// Check the fields every listed element must carry.
    ///
    /// # Errors
    ///
    /// `RequiredFieldEmpty` naming the first missing field.
    pub fn validate_required(&self) -> Result<()> {
        let mut required = vec![
            ("title", self.title.is_empty()),
            ("identifier", self.identifier.is_empty()),
            ("origin", self.origins.is_empty()),
            ("source", self.source.is_empty()),
        ];
        if self.element_type == ElementType::MoodleFile {
            required.push(("filesize", self.filesize.is_none()));
            required.push(("mimetype", self.mimetype.is_none()));
        }
        match required.into_iter().find(|(_, missing)| *missing) {
            Some((field, _)) => Err(OerError::RequiredFieldEmpty {
                field: field.to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn non_empty(field: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(OerError::RequiredFieldEmpty {
            field: field.to_string(),
        });
    }
    Ok(value)
}
