//! Element identifier codec.
//!
//! Every element is named globally by a five-part string:
//!
//! ```text
//! oer:<platform>@<host>:<type>:<valuetype>:<value>
//! ```
//!
//! e.g. `oer:moodle@moodle.example.org:file:contenthash:3f2a...`.
//!
//! Validation is "clean, then compare": each segment is passed through a
//! character filter and the identifier is valid only if nothing was removed.

use crate::errors::{OerError, Result};

/// Literal first segment of every identifier
pub const PREFIX: &str = "oer";

/// Maximum identifier length (matches the database column width)
pub const MAX_LENGTH: usize = 255;

const SEGMENTS: usize = 5;

/// The five components of an identifier after decomposition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierParts {
    pub platform: String,
    pub instance: String,
    pub element_type: String,
    pub value_type: String,
    pub value: String,
}

/// Build an identifier and validate it.
///
/// The host may be passed as a full URL root; `http://`, `https://` and a
/// trailing slash are removed before composing.
///
/// # Errors
///
/// Returns `OerError::MalformedIdentifier` if the composed string is not valid.
///
/// ```
/// use oer_core::identifier::compose;
///
/// let id = compose("moodle", "https://moodle.example.org/", "file", "contenthash", "abc123").unwrap();
/// assert_eq!(id, "oer:moodle@moodle.example.org:file:contenthash:abc123");
/// ```
pub fn compose(
    platform: &str,
    instance: &str,
    element_type: &str,
    value_type: &str,
    value: &str,
) -> Result<String> {
    let host = strip_protocol(instance);
    let identifier = format!(
        "{}:{}@{}:{}:{}:{}",
        PREFIX, platform, host, element_type, value_type, value
    );
    strict_validate(&identifier)?;
    Ok(identifier)
}

/// Check an identifier without raising.
pub fn validate(identifier: &str) -> bool {
    check(identifier).is_ok()
}

/// Check an identifier and report why it was rejected.
///
/// # Errors
///
/// Returns `OerError::MalformedIdentifier` naming the first failed rule.
pub fn strict_validate(identifier: &str) -> Result<()> {
    check(identifier).map_err(|reason| OerError::MalformedIdentifier {
        identifier: identifier.to_string(),
        reason: reason.to_string(),
    })
}

/// Split a valid identifier into its components.
///
/// # Errors
///
/// Returns `OerError::MalformedIdentifier` if the identifier does not validate.
pub fn decompose(identifier: &str) -> Result<IdentifierParts> {
    strict_validate(identifier)?;

    let segments: Vec<&str> = identifier.split(':').collect();
    let (platform, instance) = segments[1]
        .split_once('@')
        .ok_or_else(|| OerError::MalformedIdentifier {
            identifier: identifier.to_string(),
            reason: "missing '@' in platform segment".to_string(),
        })?;

    Ok(IdentifierParts {
        platform: platform.to_string(),
        instance: instance.to_string(),
        element_type: segments[2].to_string(),
        value_type: segments[3].to_string(),
        value: segments[4].to_string(),
    })
}

fn strip_protocol(host: &str) -> &str {
    let host = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host);
    host.trim_end_matches('/')
}

fn check(identifier: &str) -> std::result::Result<(), &'static str> {
    if identifier.len() > MAX_LENGTH {
        return Err("identifier exceeds 255 characters");
    }

    let segments: Vec<&str> = identifier.split(':').collect();
    if segments.len() != SEGMENTS {
        return Err("identifier must have exactly 5 colon-separated segments");
    }
    if segments[0] != PREFIX {
        return Err("identifier must start with 'oer'");
    }

    let at_count = segments[1].matches('@').count();
    if at_count != 1 {
        return Err("platform segment must contain exactly one '@'");
    }
    let (platform, host) = segments[1].split_once('@').unwrap_or_default();
    if platform.is_empty() || clean_alphanum(platform) != platform {
        return Err("platform must be alphanumeric");
    }
    if host.is_empty() || clean_host(host) != host {
        return Err("host contains invalid characters");
    }

    for segment in &segments[2..] {
        if segment.is_empty() || clean_alphanum(segment) != *segment {
            return Err("type, valuetype and value must be alphanumeric");
        }
    }

    Ok(())
}

fn clean_alphanum(input: &str) -> String {
    input.chars().filter(char::is_ascii_alphanumeric).collect()
}

fn clean_host(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '~' | '/'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_strips_protocol() {
        let id = compose("moodle", "http://lms.example.org", "file", "contenthash", "ff00").unwrap();
        assert_eq!(id, "oer:moodle@lms.example.org:file:contenthash:ff00");
    }

    #[test]
    fn test_compose_keeps_path_in_host() {
        let id = compose("moodle", "https://example.org/moodle/", "file", "contenthash", "aa").unwrap();
        assert_eq!(id, "oer:moodle@example.org/moodle:file:contenthash:aa");
    }

    #[test]
    fn test_rejects_too_long() {
        let value = "a".repeat(256);
        let id = format!("oer:ab@host:file:contenthash:{}", value);
        assert!(!validate(&id));
    }

    #[test]
    fn test_rejects_wrong_prefix() {
        assert!(!validate("bad:a@b:c:d:e"));
    }

    #[test]
    fn test_rejects_missing_at() {
        assert!(!validate("oer:nodomain:c:d:e"));
    }

    #[test]
    fn test_rejects_double_at() {
        assert!(!validate("oer:a@b@c:d:e:f"));
    }

    #[test]
    fn test_rejects_stripped_characters() {
        assert!(!validate("oer:moo-dle@host:file:contenthash:abc"));
        assert!(!validate("oer:moodle@ho st:file:contenthash:abc"));
        assert!(!validate("oer:moodle@host:file:content_hash:abc"));
        assert!(!validate("oer:moodle@host:file:contenthash:"));
    }

    #[test]
    fn test_decompose_valid() {
        let parts = decompose("oer:moodle@example.org:file:contenthash:abc").unwrap();
        assert_eq!(parts.platform, "moodle");
        assert_eq!(parts.instance, "example.org");
        assert_eq!(parts.element_type, "file");
        assert_eq!(parts.value_type, "contenthash");
        assert_eq!(parts.value, "abc");
    }

    #[test]
    fn test_strict_validate_reports_reason() {
        let err = strict_validate("oer:nodomain:c:d:e").unwrap_err();
        match err {
            OerError::MalformedIdentifier { reason, .. } => assert!(reason.contains("'@'")),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
