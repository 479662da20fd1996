// Integration tests for the migration framework

use rusqlite::Connection;
use tempfile::TempDir;

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    let mut conn = Connection::open_in_memory().unwrap();

    oer_store::migrations::apply_migrations(&mut conn).unwrap();

    let tables = table_names(&conn);
    for expected in [
        "schema_version",
        "courses",
        "file_usage",
        "external_elements",
        "course_to_file",
        "settings",
        "audit_log",
        "oer_elements",
        "oer_courseinfo",
        "oer_snapshots",
    ] {
        assert!(
            tables.contains(&expected.to_string()),
            "Missing table: {}",
            expected
        );
    }
}

#[test]
fn test_migrations_are_idempotent() {
    let mut conn = Connection::open_in_memory().unwrap();
    oer_store::migrations::apply_migrations(&mut conn).unwrap();
    oer_store::migrations::apply_migrations(&mut conn).unwrap();

    let applied = oer_store::migrations::applied_migrations(&conn).unwrap();
    assert_eq!(
        applied,
        vec![
            "001_initial_schema",
            "002_element_metadata",
            "003_snapshot_ledger"
        ]
    );
}

#[test]
fn test_open_ready_on_file_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("oer.db");

    let conn = oer_store::db::open_ready(&path).unwrap();
    drop(conn);

    // Reopening a migrated file is a no-op
    let conn = oer_store::db::open_ready(&path).unwrap();
    assert_eq!(
        oer_store::migrations::applied_migrations(&conn).unwrap().len(),
        3
    );
}
