use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel shortname for licenses that are absent or not recognised
pub const UNKNOWN_LICENSE: &str = "unknown";

/// A license as published in release documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub shortname: String,
    pub fullname: String,
    pub source: String,
}

impl License {
    pub fn new(shortname: &str, fullname: &str, source: &str) -> Self {
        Self {
            shortname: shortname.to_string(),
            fullname: fullname.to_string(),
            source: source.to_string(),
        }
    }

    /// Creative-Commons family or public domain
    pub fn is_open(shortname: &str) -> bool {
        shortname == "public" || shortname.starts_with("cc")
    }
}

/// Known licenses keyed by shortname
#[derive(Debug, Clone)]
pub struct LicenseRegistry {
    licenses: BTreeMap<String, License>,
}

impl LicenseRegistry {
    pub fn empty() -> Self {
        Self {
            licenses: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, license: License) {
        self.licenses.insert(license.shortname.clone(), license);
    }

    pub fn get(&self, shortname: &str) -> Option<&License> {
        self.licenses.get(shortname)
    }

    pub fn contains(&self, shortname: &str) -> bool {
        self.licenses.contains_key(shortname)
    }

    /// Return the shortname if registered, the `unknown` sentinel otherwise
    pub fn coerce(&self, shortname: &str) -> String {
        if self.contains(shortname) {
            shortname.to_string()
        } else {
            UNKNOWN_LICENSE.to_string()
        }
    }

    pub fn shortnames(&self) -> impl Iterator<Item = &str> {
        self.licenses.keys().map(String::as_str)
    }
}

impl Default for LicenseRegistry {
    /// The licenses a stock LMS installation ships with
    fn default() -> Self {
        let mut registry = Self::empty();
        for (short, full, source) in [
            (UNKNOWN_LICENSE, "Licence not specified", ""),
            ("allrightsreserved", "All rights reserved", "https://en.wikipedia.org/wiki/All_rights_reserved"),
            ("public", "Public domain", "https://en.wikipedia.org/wiki/Public_domain"),
            ("cc-4.0", "Creative Commons - 4.0 International", "https://creativecommons.org/licenses/by/4.0/"),
            ("cc-nc-4.0", "Creative Commons - NonCommercial 4.0 International", "https://creativecommons.org/licenses/by-nc/4.0/"),
            ("cc-nd-4.0", "Creative Commons - NoDerivatives 4.0 International", "https://creativecommons.org/licenses/by-nd/4.0/"),
            ("cc-nc-nd-4.0", "Creative Commons - NonCommercial-NoDerivatives 4.0 International", "https://creativecommons.org/licenses/by-nc-nd/4.0/"),
            ("cc-nc-sa-4.0", "Creative Commons - NonCommercial-ShareAlike 4.0 International", "https://creativecommons.org/licenses/by-nc-sa/4.0/"),
            ("cc-sa-4.0", "Creative Commons - ShareAlike 4.0 International", "https://creativecommons.org/licenses/by-sa/4.0/"),
        ] {
            registry.register(License::new(short, full, source));
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_unknown() {
        let registry = LicenseRegistry::default();
        assert_eq!(registry.coerce("cc-4.0"), "cc-4.0");
        assert_eq!(registry.coerce("gpl"), UNKNOWN_LICENSE);
    }

    #[test]
    fn test_open_licenses() {
        assert!(License::is_open("cc-nc-4.0"));
        assert!(License::is_open("public"));
        assert!(!License::is_open("allrightsreserved"));
    }
}
