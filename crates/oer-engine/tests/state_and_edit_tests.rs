// Element states, metadata edits and editor self-heal

mod common;

use common::*;
use oer_core::errors::ExErrorKind;
use oer_core::logging_facility::init_test_capture;
use oer_core::model::{EditState, MetadataEdit, ReleaseState, StoredMetadata};
use oer_engine::commands::{edit_metadata, resolve_element_state, run_release, sync_course};
use oer_engine::ReleaseOptions;
use oer_store::repo::{AuditRepo, MetadataRepo};

fn title_edit(title: &str) -> MetadataEdit {
    MetadataEdit {
        title: Some(title.into()),
        ..MetadataEdit::default()
    }
}

#[test]
fn test_listing_resolves_every_element() {
    let f = fixture();
    let listing = oer_engine::list_course_elements(&f.conn, &f.registry, &f.ctx, 5).unwrap();

    assert_eq!(listing.elements.len(), 3);
    assert!(listing.skipped.is_empty());
    for element in &listing.elements {
        let state = element.state().unwrap();
        assert_eq!(state.state, EditState::NotEdited);
        assert!(state.writable);
    }
}

#[test]
fn test_state_transitions_not_edited_edited_released() {
    let mut f = fixture();
    let id = file_id("ab12");
    let element = element_in(&f, 5, &id);

    let state = resolve_element_state(&f.conn, &f.ctx, &element, 5).unwrap();
    assert_eq!(state.state, EditState::NotEdited);
    assert_eq!(state.editor_course_id, 0);
    assert!(state.writable);

    let edit = MetadataEdit {
        release_state: Some(ReleaseState::Release),
        ..title_edit("Light and lenses")
    };
    let saved = edit_metadata(&f.conn, &f.ctx, &element, 5, &edit).unwrap();
    assert_eq!(saved.course_id, 5);
    assert_eq!(saved.user_modified, 42);

    let from_editor = resolve_element_state(&f.conn, &f.ctx, &element, 5).unwrap();
    assert_eq!(from_editor.state, EditState::Edited);
    assert!(from_editor.writable);
    let from_other = resolve_element_state(&f.conn, &f.ctx, &element, 6).unwrap();
    assert_eq!(from_other.state, EditState::Edited);
    assert_eq!(from_other.editor_course_id, 5);
    assert!(!from_other.writable);
    assert!(from_other.courses[&5].is_editor);

    let err = edit_metadata(&f.conn, &f.ctx, &element, 6, &title_edit("Hijack")).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotWritable);

    sync_course(&mut f.conn, &f.registry, &f.ctx, 5).unwrap();
    let report = run_release(&mut f.conn, &f.registry, &f.ctx, &ReleaseOptions::default()).unwrap();
    assert_eq!(report.inserted(), 1);

    let released = resolve_element_state(&f.conn, &f.ctx, &element, 5).unwrap();
    assert_eq!(released.state, EditState::Released);
    assert!(!released.writable);
    let err = edit_metadata(&f.conn, &f.ctx, &element, 5, &title_edit("Too late")).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotWritable);
}

#[test]
fn test_first_edit_starts_from_source_values() {
    let f = fixture();
    let id = file_id("cd34");
    let element = element_in(&f, 5, &id);

    let edit = MetadataEdit {
        description: Some("Thin lenses".into()),
        ..MetadataEdit::default()
    };
    let saved = edit_metadata(&f.conn, &f.ctx, &element, 5, &edit).unwrap();

    assert_eq!(saved.title, "lenses.pdf");
    assert_eq!(saved.license, "cc-4.0");
    assert_eq!(saved.persons.len(), 1);
    assert_eq!(saved.persons[0].name, "Ada Lovelace");
    assert_eq!(saved.description, "Thin lenses");
}

#[test]
fn test_invalid_fields_are_rejected() {
    let f = fixture();
    let element = element_in(&f, 5, &file_id("cd34"));

    let err = edit_metadata(&f.conn, &f.ctx, &element, 5, &title_edit("  ")).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidField);
    assert_eq!(err.field(), Some("title"));

    let bad_license = MetadataEdit {
        license: Some("no-such-license".into()),
        ..MetadataEdit::default()
    };
    let err = edit_metadata(&f.conn, &f.ctx, &element, 5, &bad_license).unwrap_err();
    assert_eq!(err.field(), Some("license"));

    let bad_classification = MetadataEdit {
        classification: Some(serde_json::json!(["101"])),
        ..MetadataEdit::default()
    };
    let err = edit_metadata(&f.conn, &f.ctx, &element, 5, &bad_classification).unwrap_err();
    assert_eq!(err.field(), Some("classification"));

    assert!(MetadataRepo::get_by_identifier(&f.conn, &file_id("cd34"))
        .unwrap()
        .is_none());
}

#[test]
fn test_last_writer_wins_across_connections() {
    let f = fixture();
    let other = second_connection(&f);
    let element = element_in(&f, 5, &file_id("cd34"));

    edit_metadata(&f.conn, &f.ctx, &element, 5, &title_edit("Lenses")).unwrap();
    let first_view = MetadataRepo::get_by_identifier(&other, &file_id("cd34"))
        .unwrap()
        .unwrap();
    edit_metadata(&other, &f.ctx, &element, 5, &title_edit("Thin lenses")).unwrap();
    edit_metadata(&f.conn, &f.ctx, &element, 5, &title_edit("Thick lenses")).unwrap();

    // The second connection read "Lenses" and its write was silently replaced
    assert_eq!(first_view.title, "Lenses");
    let stored = MetadataRepo::get_by_identifier(&other, &file_id("cd34"))
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "Thick lenses");
}

#[test]
fn test_stale_editor_is_reassigned_and_audited() {
    let capture = init_test_capture();
    let f = fixture();
    let id = file_id("ab12");

    let mut stale = StoredMetadata::new(7, id.as_str());
    stale.title = "Archived notes".into();
    MetadataRepo::insert(&f.conn, &stale).unwrap();

    let element = element_in(&f, 6, &id);
    let state = element.state().unwrap();
    assert_eq!(state.editor_course_id, 5);
    assert!(!state.writable);

    let healed = MetadataRepo::get_by_identifier(&f.conn, &id).unwrap().unwrap();
    assert_eq!(healed.course_id, 5);
    assert_eq!(healed.title, "Archived notes");

    let entries = AuditRepo::list_for_identifier(&f.conn, &id).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, "ERROR");
    assert_eq!(entries[0].course_id, Some(5));
    assert!(entries[0].message.contains("ERR_INCONSISTENT_STATE"));

    let events = capture.audit_events_for(&id);
    assert!(!events.is_empty());
    assert_eq!(events[0].level, tracing::Level::ERROR);
    assert_eq!(events[0].field("from_course"), Some("7"));
    assert_eq!(events[0].field("to_course"), Some("5"));
}
