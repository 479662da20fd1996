//! Repository layer for persisting domain models to SQLite
//!
//! Each repository is a unit struct with associated functions taking a
//! `&Connection`; a `Transaction` derefs to one, so the same calls work
//! inside a transaction.

pub mod audit;
pub mod course;
pub mod courseinfo;
pub mod metadata;
pub mod settings;

pub use audit::{AuditEntry, AuditRepo};
pub use course::{CourseRepo, ExternalRow, FileUsageRow, SqliteUsageLookup};
pub use courseinfo::CourseInfoRepo;
pub use metadata::MetadataRepo;
pub use settings::SettingsRepo;

use rusqlite::types::Type;
use rusqlite::Row;
use serde::de::DeserializeOwned;

/// Read a TEXT column holding JSON
pub(crate) fn json_column<T: DeserializeOwned>(row: &Row<'_>, column: &str) -> rusqlite::Result<T> {
    let text: String = row.get(column)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

/// Convert a domain decoding error into a column conversion failure
pub(crate) fn conversion<E>(err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(err))
}

pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
