/// Shape of published release documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationProfile {
    /// `v1.0.0`: flat documents, files keyed by content hash
    Legacy,
    /// `v2.0.0`: `{identifier, type, metadata, release}`
    Current,
}

impl ApplicationProfile {
    pub fn version(&self) -> &'static str {
        match self {
            ApplicationProfile::Legacy => "v1.0.0",
            ApplicationProfile::Current => "v2.0.0",
        }
    }

    /// Accepts `v1.0.0`, `1.0.0`, `v2.0.0`, `2.0.0`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().trim_start_matches('v') {
            "1.0.0" => Some(ApplicationProfile::Legacy),
            "2.0.0" => Some(ApplicationProfile::Current),
            _ => None,
        }
    }

    /// Pick the profile requested by a header value, else `fallback`.
    ///
    /// The header may be a bare version or a content type with an
    /// `applicationprofile=` parameter.
    pub fn negotiate(header: Option<&str>, fallback: ApplicationProfile) -> Self {
        let Some(header) = header else {
            return fallback;
        };
        header
            .split(';')
            .map(str::trim)
            .find_map(|part| {
                let value = part
                    .strip_prefix("applicationprofile=")
                    .unwrap_or(part)
                    .trim_matches('"');
                Self::parse(value)
            })
            .unwrap_or(fallback)
    }

    /// Key of the document list in a release response
    pub fn list_key(&self) -> &'static str {
        match self {
            ApplicationProfile::Legacy => "files",
            ApplicationProfile::Current => "elements",
        }
    }
}
