//! Persistent audit trail for self-healed inconsistencies and other
//! conditions operators must be able to review after the fact.

#![allow(clippy::result_large_err)]

use super::now;
use crate::errors::{from_rusqlite, Result};
use rusqlite::{params, Connection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub id: i64,
    pub severity: String,
    pub op: String,
    pub identifier: Option<String>,
    pub course_id: Option<i64>,
    pub message: String,
    pub time_created: i64,
}

pub struct AuditRepo;

impl AuditRepo {
    pub fn record(
        conn: &Connection,
        severity: &str,
        op: &str,
        identifier: Option<&str>,
        course_id: Option<i64>,
        message: &str,
    ) -> Result<i64> {
        conn.execute(
            "INSERT INTO audit_log (severity, op, identifier, course_id, message, time_created)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![severity, op, identifier, course_id, message, now()],
        )
        .map_err(from_rusqlite)?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_for_identifier(conn: &Connection, identifier: &str) -> Result<Vec<AuditEntry>> {
        Self::list(conn, "WHERE identifier = ?1", params![identifier])
    }

    pub fn list_for_op(conn: &Connection, op: &str) -> Result<Vec<AuditEntry>> {
        Self::list(conn, "WHERE op = ?1", params![op])
    }

    fn list(conn: &Connection, filter: &str, args: impl rusqlite::Params) -> Result<Vec<AuditEntry>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT id, severity, op, identifier, course_id, message, time_created
                 FROM audit_log {} ORDER BY id",
                filter
            ))
            .map_err(from_rusqlite)?;
        let entries = stmt
            .query_map(args, |row| {
                Ok(AuditEntry {
                    id: row.get("id")?,
                    severity: row.get("severity")?,
                    op: row.get("op")?,
                    identifier: row.get("identifier")?,
                    course_id: row.get("course_id")?,
                    message: row.get("message")?,
                    time_created: row.get("time_created")?,
                })
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(entries)
    }
}
