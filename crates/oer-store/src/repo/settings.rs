//! Key/value runtime state

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use chrono::{DateTime, Utc};
use oer_core::errors::{ExError, ExErrorKind};
use rusqlite::{params, Connection, OptionalExtension};

pub const LAST_RELEASE_RUN: &str = "last_release_run";
pub const SEED_DIGEST: &str = "seed_digest";

pub struct SettingsRepo;

impl SettingsRepo {
    pub fn get(conn: &Connection, name: &str) -> Result<Option<String>> {
        conn.query_row("SELECT value FROM settings WHERE name = ?1", [name], |row| {
            row.get(0)
        })
        .optional()
        .map_err(from_rusqlite)
    }

    pub fn set(conn: &Connection, name: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO settings (name, value) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value",
            params![name, value],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn last_release_run(conn: &Connection) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = Self::get(conn, LAST_RELEASE_RUN)? else {
            return Ok(None);
        };
        let parsed = DateTime::parse_from_rfc3339(&raw).map_err(|e| {
            ExError::new(ExErrorKind::InconsistentState)
                .with_op("settings_last_release_run")
                .with_field(LAST_RELEASE_RUN)
                .with_message(e.to_string())
        })?;
        Ok(Some(parsed.with_timezone(&Utc)))
    }

    pub fn set_last_release_run(conn: &Connection, at: DateTime<Utc>) -> Result<()> {
        Self::set(conn, LAST_RELEASE_RUN, &at.to_rfc3339())
    }
}
