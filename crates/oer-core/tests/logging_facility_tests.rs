#![allow(clippy::unwrap_used, clippy::expect_used)]

use oer_core::errors::OerError;
use oer_core::logging_facility::test_capture::init_test_capture;
use oer_core::{log_audit, log_op_end, log_op_error, log_op_start};
use oer_core_types::schema::{
    EVENT_AUDIT, EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_COMPONENT, FIELD_COURSE_ID,
    FIELD_DURATION_MS, FIELD_ERR_CODE, FIELD_ERR_KIND,
};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "logging_start_release_course";

    log_op_start!(op_name, course_id = 5);

    let events = capture.events_for_op(op_name);
    let start = events
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_START))
        .expect("start event");
    assert_eq!(start.field(FIELD_COURSE_ID), Some("5"));
    assert!(start.field(FIELD_COMPONENT).is_some());
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "logging_end_release_course";

    log_op_end!(op_name, duration_ms = 42);

    let end_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();
    assert_eq!(end_events.len(), 1);
    assert_eq!(end_events[0].field(FIELD_DURATION_MS), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "logging_error_load_elements";

    let err = OerError::Source {
        plugin: "mod_folder".to_string(),
        message: "timeout".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events_for_op(op_name);
    let error_event = events
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("error event");
    assert_eq!(error_event.level, tracing::Level::ERROR);
    assert_eq!(error_event.field(FIELD_ERR_CODE), Some("ERR_EXTERNAL_SERVICE"));
    assert!(error_event.field(FIELD_ERR_KIND).is_some());
}

#[test]
fn test_audit_entries_are_errors() {
    let capture = init_test_capture();
    let identifier = "oer:moodle@example.org:file:contenthash:auditlogtest";

    log_audit!(
        "logging_audit_resolve_state",
        "editor course reassigned",
        identifier = identifier,
        from_course = 2,
        to_course = 3
    );

    let audits = capture.audit_events_for(identifier);
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].level, tracing::Level::ERROR);
    assert_eq!(audits[0].event.as_deref(), Some(EVENT_AUDIT));
    assert_eq!(audits[0].field("to_course"), Some("3"));
}
