// Snapshot ledger: compare-and-insert, release numbering and queries

use oer_core::model::{Element, ElementType, StoredFileRef, StoredMetadata};
use oer_core::snapshot::SnapshotCandidate;
use oer_store::snapshot::{
    by_release_number, has_snapshot, history_for_identifier, insert_if_changed, latest_for,
    latest_release_number, next_release_number, release_dates, InsertOutcome, ReleaseNumber,
};
use oer_store::snapshot::ReleaseNumber::Fixed;
use rusqlite::Connection;
use serde_json::json;
use tempfile::TempDir;

const IDENTIFIER: &str = "oer:moodle@lms.example.org:file:contenthash:ab12";

fn setup() -> (TempDir, Connection) {
    let dir = TempDir::new().unwrap();
    let conn = oer_store::db::open_ready(dir.path().join("oer.db")).unwrap();
    (dir, conn)
}

fn element() -> Element {
    let mut e = Element::new(ElementType::MoodleFile);
    e.set_title("notes.pdf").unwrap();
    e.set_identifier(IDENTIFIER).unwrap();
    e.set_origin("mod_resource").unwrap();
    e.set_source("https://lms.example.org/pluginfile.php/5/ab12").unwrap();
    e.set_mimetype("application/pdf").unwrap();
    e.set_filesize(2048);
    e.set_stored_file(StoredFileRef {
        contenthash: "ab12".into(),
        filename: "notes.pdf".into(),
        timecreated: 1_700_000_000,
    });
    e
}

fn candidate(title: &str) -> SnapshotCandidate {
    let mut record = StoredMetadata::new(5, IDENTIFIER);
    record.title = title.into();
    record.license = "cc-4.0".into();
    SnapshotCandidate::build(&element(), &record, json!([]), json!({}))
}

#[test]
fn test_same_candidate_inserts_once() {
    let (_dir, mut conn) = setup();

    let first = insert_if_changed(&mut conn, &candidate("Notes"), Fixed(1), 100).unwrap();
    let second = insert_if_changed(&mut conn, &candidate("Notes"), Fixed(2), 200).unwrap();

    assert!(first.was_inserted());
    assert_eq!(
        second,
        InsertOutcome::Unchanged {
            hash: first.hash().to_string()
        }
    );
    assert_eq!(history_for_identifier(&conn, IDENTIFIER).unwrap().len(), 1);
}

#[test]
fn test_changed_field_inserts_new_row() {
    let (_dir, mut conn) = setup();

    insert_if_changed(&mut conn, &candidate("Notes"), Fixed(1), 100).unwrap();
    insert_if_changed(&mut conn, &candidate("Notes, revised"), Fixed(2), 200).unwrap();

    let history = history_for_identifier(&conn, IDENTIFIER).unwrap();
    assert_eq!(history.len(), 2);
    assert_ne!(history[0].release_hash, history[1].release_hash);
    assert_eq!(
        latest_for(&conn, 5, IDENTIFIER).unwrap().unwrap().title,
        "Notes, revised"
    );
}

#[test]
fn test_reverting_to_earlier_state_inserts_again() {
    let (_dir, mut conn) = setup();

    insert_if_changed(&mut conn, &candidate("A"), Fixed(1), 100).unwrap();
    insert_if_changed(&mut conn, &candidate("B"), Fixed(2), 200).unwrap();
    let third = insert_if_changed(&mut conn, &candidate("A"), Fixed(3), 300).unwrap();

    assert!(third.was_inserted());
    assert_eq!(history_for_identifier(&conn, IDENTIFIER).unwrap().len(), 3);
}

#[test]
fn test_two_connections_do_not_duplicate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("oer.db");
    let mut a = oer_store::db::open_ready(&path).unwrap();
    let mut b = oer_store::db::open_ready(&path).unwrap();

    let first = insert_if_changed(&mut a, &candidate("Notes"), Fixed(1), 100).unwrap();
    let second = insert_if_changed(&mut b, &candidate("Notes"), Fixed(1), 100).unwrap();

    assert!(first.was_inserted());
    assert!(!second.was_inserted());
    assert_eq!(history_for_identifier(&a, IDENTIFIER).unwrap().len(), 1);
}

#[test]
fn test_release_numbers_and_dates() {
    let (_dir, mut conn) = setup();
    assert_eq!(next_release_number(&conn).unwrap(), 1);
    assert_eq!(latest_release_number(&conn).unwrap(), None);
    assert!(!has_snapshot(&conn, IDENTIFIER).unwrap());

    insert_if_changed(&mut conn, &candidate("A"), Fixed(1), 100).unwrap();
    insert_if_changed(&mut conn, &candidate("B"), Fixed(2), 200).unwrap();

    assert_eq!(next_release_number(&conn).unwrap(), 3);
    assert_eq!(latest_release_number(&conn).unwrap(), Some(2));
    assert!(has_snapshot(&conn, IDENTIFIER).unwrap());

    let dates = release_dates(&conn).unwrap();
    assert_eq!(dates.len(), 2);
    assert_eq!(dates[0].release_number, 2);
    assert_eq!(dates[0].time_created, 200);

    let run = by_release_number(&conn, 1).unwrap();
    assert_eq!(run.len(), 1);
    assert_eq!(run[0].title, "A");
    assert_eq!(run[0].element_type, ElementType::MoodleFile);
    assert_eq!(run[0].type_data["mimetype"], "application/pdf");
}

#[test]
fn test_allocated_release_numbers_differ_across_connections() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("oer.db");
    let mut a = oer_store::db::open_ready(&path).unwrap();
    let mut b = oer_store::db::open_ready(&path).unwrap();

    // Both runs read the same maximum before either inserts
    assert_eq!(next_release_number(&a).unwrap(), 1);
    assert_eq!(next_release_number(&b).unwrap(), 1);

    let first = insert_if_changed(&mut a, &candidate("A"), ReleaseNumber::Allocate, 100).unwrap();
    let second = insert_if_changed(&mut b, &candidate("B"), ReleaseNumber::Allocate, 100).unwrap();

    let number = |outcome: &InsertOutcome| match outcome {
        InsertOutcome::Inserted { release_number, .. } => *release_number,
        InsertOutcome::Unchanged { .. } => panic!("expected an insert"),
    };
    assert_eq!(number(&first), 1);
    assert_eq!(number(&second), 2);
}
