#![allow(clippy::unwrap_used, clippy::expect_used)]

use oer_core::errors::OerError;
use oer_core::identifier::{compose, decompose, strict_validate, validate, MAX_LENGTH};
use proptest::prelude::*;

proptest! {
    #[test]
    fn compose_then_decompose_returns_parts(
        platform in "[a-zA-Z0-9]{1,12}",
        host in "[a-z0-9]([a-z0-9._~/-]{0,30}[a-z0-9])?",
        element_type in "[a-zA-Z0-9]{1,12}",
        value_type in "[a-zA-Z0-9]{1,12}",
        value in "[a-fA-F0-9]{1,64}",
    ) {
        let id = compose(&platform, &host, &element_type, &value_type, &value).unwrap();
        prop_assert!(validate(&id));

        let parts = decompose(&id).unwrap();
        prop_assert_eq!(parts.platform, platform);
        prop_assert_eq!(parts.instance, host);
        prop_assert_eq!(parts.element_type, element_type);
        prop_assert_eq!(parts.value_type, value_type);
        prop_assert_eq!(parts.value, value);
    }

    #[test]
    fn protocol_prefix_never_changes_identifier(
        host in "[a-z0-9]{1,20}\\.[a-z]{2,6}",
        value in "[a-f0-9]{8,40}",
    ) {
        let bare = compose("moodle", &host, "file", "contenthash", &value).unwrap();
        let http = compose("moodle", &format!("http://{}", host), "file", "contenthash", &value).unwrap();
        let https = compose("moodle", &format!("https://{}/", host), "file", "contenthash", &value).unwrap();
        prop_assert_eq!(&bare, &http);
        prop_assert_eq!(&bare, &https);
    }

    #[test]
    fn punctuation_in_value_is_rejected(
        prefix in "[a-z0-9]{1,10}",
        bad in "[!#$%&*+,;=?\\[\\] ]",
    ) {
        let id = format!("oer:moodle@example.org:file:contenthash:{}{}", prefix, bad);
        prop_assert!(!validate(&id));
    }
}

#[test]
fn test_rejects_over_max_length() {
    let value = "a".repeat(MAX_LENGTH);
    let id = format!("oer:moodle@example.org:file:contenthash:{}", value);
    assert!(id.len() > MAX_LENGTH);
    assert!(matches!(
        strict_validate(&id),
        Err(OerError::MalformedIdentifier { .. })
    ));
}

#[test]
fn test_rejects_wrong_prefix() {
    assert!(!validate("xyz:moodle@example.org:file:contenthash:ab"));
}

#[test]
fn test_rejects_missing_at() {
    assert!(!validate("oer:moodleexample.org:file:contenthash:ab"));
}

#[test]
fn test_compose_rejects_bad_value() {
    assert!(compose("moodle", "example.org", "file", "contenthash", "a:b").is_err());
}
