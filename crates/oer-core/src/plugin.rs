//! Collaborator seams.
//!
//! Source plugins contribute elements; the other traits let the host supply
//! file usage, extra course metadata, extra release data and editor
//! notifications. All of them are registered once in a [`PluginRegistry`].

use std::collections::BTreeSet;

use crate::errors::{ExResult, OerError, Result};
use crate::model::{CourseInfo, Element, ElementList};

/// A metadata field a source plugin can write back to its own storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritableField {
    pub name: String,
    pub label: String,
}

/// A person role a source plugin understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub shortname: String,
    pub label: String,
    pub required: bool,
}

/// A content source contributing elements to course listings
pub trait SourcePlugin {
    /// Unique registry key, e.g. `mod_resource`
    fn key(&self) -> &str;

    fn load_elements(&self, course_id: i64) -> Result<ElementList>;

    fn writable_fields(&self) -> Vec<WritableField> {
        Vec::new()
    }

    fn write_to_source(&self, _element: &Element) -> Result<()> {
        Ok(())
    }

    fn supported_licenses(&self) -> Vec<String> {
        Vec::new()
    }

    fn supported_roles(&self) -> Vec<Role>;

    /// Called after a snapshot of `element` was inserted; `false` reports failure
    fn set_element_to_release(&self, element: &Element) -> bool;
}

/// Courses referencing a stored file
pub trait UsageLookup {
    fn courses_using(&self, contenthash: &str) -> ExResult<BTreeSet<i64>>;
}

/// Additional course metadata beyond the native course record
pub trait CourseInfoProvider {
    fn key(&self) -> &str;

    /// Zero or one entry for the course
    fn course_info(&self, course_id: i64) -> ExResult<Option<CourseInfo>>;
}

/// Extra data attached to every snapshot under the contributor's key
pub trait ReleaseDataContributor {
    fn key(&self) -> &str;

    fn release_data(&self, course_id: i64, element: &Element) -> Option<serde_json::Value>;
}

/// Informs editors when an element lost its release flag
pub trait EditorNotifier {
    fn release_revoked(&self, course_id: i64, identifier: &str, missing: &[String]) -> ExResult<()>;
}

/// Plugin keys: lowercase ASCII letters, digits and underscores
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(OerError::ContractViolation {
            message: format!("invalid plugin key '{}'", key),
        })
    }
}

/// All collaborators known to the running instance
#[derive(Default)]
pub struct PluginRegistry {
    sources: Vec<Box<dyn SourcePlugin>>,
    course_info: Option<Box<dyn CourseInfoProvider>>,
    contributors: Vec<Box<dyn ReleaseDataContributor>>,
    notifier: Option<Box<dyn EditorNotifier>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// `ContractViolation` for an invalid key, `DuplicatePlugin` for a key already taken.
    pub fn register_source(&mut self, plugin: Box<dyn SourcePlugin>) -> Result<()> {
        validate_key(plugin.key())?;
        if self.source(plugin.key()).is_some() {
            return Err(OerError::DuplicatePlugin {
                key: plugin.key().to_string(),
            });
        }
        self.sources.push(plugin);
        Ok(())
    }

    /// # Errors
    ///
    /// `ContractViolation` for an invalid key, `DuplicatePlugin` if a provider is set.
    pub fn set_course_info_provider(&mut self, provider: Box<dyn CourseInfoProvider>) -> Result<()> {
        validate_key(provider.key())?;
        if let Some(existing) = &self.course_info {
            return Err(OerError::DuplicatePlugin {
                key: existing.key().to_string(),
            });
        }
        self.course_info = Some(provider);
        Ok(())
    }

    /// # Errors
    ///
    /// `ContractViolation` for an invalid key, `DuplicatePlugin` for a key already taken.
    pub fn register_contributor(&mut self, contributor: Box<dyn ReleaseDataContributor>) -> Result<()> {
        validate_key(contributor.key())?;
        if self.contributors.iter().any(|c| c.key() == contributor.key()) {
            return Err(OerError::DuplicatePlugin {
                key: contributor.key().to_string(),
            });
        }
        self.contributors.push(contributor);
        Ok(())
    }

    pub fn set_notifier(&mut self, notifier: Box<dyn EditorNotifier>) {
        self.notifier = Some(notifier);
    }

    pub fn source(&self, key: &str) -> Option<&dyn SourcePlugin> {
        self.sources
            .iter()
            .find(|p| p.key() == key)
            .map(|p| p.as_ref())
    }

    pub fn sources(&self) -> impl Iterator<Item = &dyn SourcePlugin> {
        self.sources.iter().map(|p| p.as_ref())
    }

    pub fn course_info_provider(&self) -> Option<&dyn CourseInfoProvider> {
        self.course_info.as_deref()
    }

    pub fn contributors(&self) -> impl Iterator<Item = &dyn ReleaseDataContributor> {
        self.contributors.iter().map(|c| c.as_ref())
    }

    pub fn notifier(&self) -> Option<&dyn EditorNotifier> {
        self.notifier.as_deref()
    }

    /// Elements of every source for one course, duplicates merged.
    ///
    /// A failing source is logged and skipped.
    pub fn load_elements(&self, course_id: i64) -> ElementList {
        let mut all = ElementList::new();
        for plugin in self.sources() {
            match plugin.load_elements(course_id) {
                Ok(list) => all.merge(list),
                Err(err) => {
                    tracing::warn!(
                        plugin = plugin.key(),
                        course_id,
                        error = %err,
                        "source plugin failed to load elements"
                    );
                }
            }
        }
        all.merge_duplicates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementType;

    struct FixedSource {
        key: &'static str,
        titles: Vec<(&'static str, &'static str)>,
    }

    impl SourcePlugin for FixedSource {
        fn key(&self) -> &str {
            self.key
        }

        fn load_elements(&self, _course_id: i64) -> Result<ElementList> {
            let mut list = ElementList::new();
            for (hash, title) in &self.titles {
                let mut e = Element::new(ElementType::External);
                e.set_title(*title)?;
                e.set_identifier(format!("oer:moodle@example.org:external:url:{}", hash))?;
                e.set_origin(self.key)?;
                e.set_source("https://example.org")?;
                list.add(e)?;
            }
            Ok(list)
        }

        fn supported_roles(&self) -> Vec<Role> {
            Vec::new()
        }

        fn set_element_to_release(&self, _element: &Element) -> bool {
            true
        }
    }

    struct BrokenSource;

    impl SourcePlugin for BrokenSource {
        fn key(&self) -> &str {
            "broken"
        }

        fn load_elements(&self, _course_id: i64) -> Result<ElementList> {
            Err(OerError::Source {
                plugin: "broken".into(),
                message: "backend offline".into(),
            })
        }

        fn supported_roles(&self) -> Vec<Role> {
            Vec::new()
        }

        fn set_element_to_release(&self, _element: &Element) -> bool {
            false
        }
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut registry = PluginRegistry::new();
        registry
            .register_source(Box::new(FixedSource { key: "mod_a", titles: vec![] }))
            .unwrap();
        let err = registry
            .register_source(Box::new(FixedSource { key: "mod_a", titles: vec![] }))
            .unwrap_err();
        assert_eq!(err, OerError::DuplicatePlugin { key: "mod_a".into() });
    }

    #[test]
    fn test_invalid_key_rejected() {
        let mut registry = PluginRegistry::new();
        assert!(registry
            .register_source(Box::new(FixedSource { key: "Mod A", titles: vec![] }))
            .is_err());
    }

    #[test]
    fn test_load_elements_merges_and_skips_failures() {
        let mut registry = PluginRegistry::new();
        registry
            .register_source(Box::new(FixedSource {
                key: "mod_a",
                titles: vec![("x1", "From A"), ("x2", "Only A")],
            }))
            .unwrap();
        registry.register_source(Box::new(BrokenSource)).unwrap();
        registry
            .register_source(Box::new(FixedSource {
                key: "mod_b",
                titles: vec![("x1", "From B")],
            }))
            .unwrap();

        let list = registry.load_elements(1);
        assert_eq!(list.len(), 2);
        let first = list.get(0).unwrap();
        assert_eq!(first.title(), "From A");
        assert_eq!(first.origins(), &["mod_a".to_string(), "mod_b".to_string()]);
    }
}
