//! Database connection management
//!
//! Provides utilities for opening and managing SQLite connections

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::migrations::apply_migrations;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection for concurrent release jobs
pub fn configure(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(from_rusqlite)?;

    // journal_mode returns a row, so it cannot go through execute()
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
        .map_err(from_rusqlite)?;

    // Writers waiting on an IMMEDIATE transaction retry instead of failing
    conn.busy_timeout(Duration::from_secs(5))
        .map_err(from_rusqlite)?;

    Ok(())
}

/// Open, configure and migrate a database file
pub fn open_ready<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let mut conn = open(path)?;
    configure(&conn)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}
