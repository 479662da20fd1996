//! Seed parser with validation
//!
//! Parses YAML and validates schema version, course references and the
//! identifiers every file and external entry will be published under.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, seed_validation, Result};
use crate::seed::format_v0::SeedV0;
use crate::seed::source::{external_identifier, file_identifier};
use oer_core::OerConfig;
use rusqlite::{Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Parse a seed file from a path
pub fn parse_seed_file(path: &Path, config: &OerConfig) -> Result<SeedV0> {
    parse_seed_file_with_db(path, config, None)
}

/// Parse a seed file with optional database context: courses may then be
/// referenced without being declared in the same seed.
pub fn parse_seed_file_with_db(
    path: &Path,
    config: &OerConfig,
    conn: Option<&Connection>,
) -> Result<SeedV0> {
    let content = fs::read_to_string(path)
        .map_err(|e| seed_validation(&format!("Failed to read seed file: {}", e)))?;

    parse_seed_str_with_db(&content, config, conn)
}

/// Parse a seed from a string
pub fn parse_seed_str(content: &str, config: &OerConfig) -> Result<SeedV0> {
    parse_seed_str_with_db(content, config, None)
}

pub fn parse_seed_str_with_db(
    content: &str,
    config: &OerConfig,
    conn: Option<&Connection>,
) -> Result<SeedV0> {
    let seed: SeedV0 = serde_yaml::from_str(content)
        .map_err(|e| seed_validation(&format!("YAML parse error: {}", e)))?;

    validate_seed(&seed, config, conn)?;

    Ok(seed)
}

fn validate_seed(seed: &SeedV0, config: &OerConfig, conn: Option<&Connection>) -> Result<()> {
    if seed.schema_version != 0 {
        return Err(seed_validation(&format!(
            "Unsupported schema_version: {}. Expected 0",
            seed.schema_version
        )));
    }

    let mut course_ids = BTreeSet::new();
    for course in &seed.courses {
        if !course_ids.insert(course.id) {
            return Err(seed_validation(&format!("Duplicate course id {}", course.id)));
        }
        if course.fullname.trim().is_empty() {
            return Err(seed_validation(&format!(
                "Course {} has an empty fullname",
                course.id
            )));
        }
    }

    let known_course = |id: i64| -> Result<bool> {
        if course_ids.contains(&id) {
            return Ok(true);
        }
        match conn {
            Some(conn) => conn
                .query_row("SELECT 1 FROM courses WHERE id = ?1", [id], |_| Ok(()))
                .optional()
                .map(|found| found.is_some())
                .map_err(from_rusqlite),
            None => Ok(false),
        }
    };

    for file in &seed.files {
        if !known_course(file.course_id)? {
            return Err(seed_validation(&format!(
                "File {} references non-existent course {}",
                file.contenthash, file.course_id
            )));
        }
        file_identifier(config, &file.contenthash).map_err(|e| {
            seed_validation(&format!("File {}: {}", file.contenthash, e))
        })?;
        if file.filename.trim().is_empty() || file.mimetype.trim().is_empty() {
            return Err(seed_validation(&format!(
                "File {} needs a filename and a mimetype",
                file.contenthash
            )));
        }
        oer_core::plugin::validate_key(&file.component)
            .map_err(|e| seed_validation(&e.to_string()))?;
    }

    for external in &seed.externals {
        if !known_course(external.course_id)? {
            return Err(seed_validation(&format!(
                "External {} references non-existent course {}",
                external.value, external.course_id
            )));
        }
        external_identifier(config, &external.value)
            .map_err(|e| seed_validation(&format!("External {}: {}", external.value, e)))?;
        if external.title.trim().is_empty() || external.url.trim().is_empty() {
            return Err(seed_validation(&format!(
                "External {} needs a title and a url",
                external.value
            )));
        }
        oer_core::plugin::validate_key(&external.origin)
            .map_err(|e| seed_validation(&e.to_string()))?;
    }

    let hashes: BTreeSet<&str> = seed.files.iter().map(|f| f.contenthash.as_str()).collect();
    for rule in &seed.overrides {
        if !hashes.contains(rule.contenthash.as_str()) {
            return Err(seed_validation(&format!(
                "Override references unknown file {}",
                rule.contenthash
            )));
        }
        if !known_course(rule.course_id)? {
            return Err(seed_validation(&format!(
                "Override references non-existent course {}",
                rule.course_id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
schema_version: 0
courses:
  - id: 5
    fullname: Physics
files:
  - contenthash: ab12
    course_id: 5
    filename: notes.pdf
    mimetype: application/pdf
"#;

    #[test]
    fn test_parse_valid_seed() {
        let seed = parse_seed_str(VALID, &OerConfig::default()).unwrap();
        assert_eq!(seed.files.len(), 1);
    }

    #[test]
    fn test_reject_invalid_schema_version() {
        let err = parse_seed_str("schema_version: 99\n", &OerConfig::default()).unwrap_err();
        assert!(err.to_string().contains("schema_version"));
    }

    #[test]
    fn test_reject_unknown_course() {
        let yaml = VALID.replace("course_id: 5", "course_id: 9");
        let err = parse_seed_str(&yaml, &OerConfig::default()).unwrap_err();
        assert!(err.to_string().contains("non-existent course 9"));
    }

    #[test]
    fn test_reject_hash_that_breaks_identifier() {
        let yaml = VALID.replace("contenthash: ab12", "contenthash: ab-12");
        let err = parse_seed_str(&yaml, &OerConfig::default()).unwrap_err();
        assert!(err.to_string().contains("ab-12"));
    }

    #[test]
    fn test_course_known_from_database() {
        let mut conn = Connection::open_in_memory().unwrap();
        crate::migrations::apply_migrations(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO courses (id, fullname) VALUES (9, 'Chemistry')",
            [],
        )
        .unwrap();

        let yaml = r#"
schema_version: 0
externals:
  - course_id: 9
    origin: oerexternal
    value: vid42
    title: Titration
    url: https://videos.example.org/42
"#;
        assert!(parse_seed_str_with_db(yaml, &OerConfig::default(), Some(&conn)).is_ok());
        assert!(parse_seed_str(yaml, &OerConfig::default()).is_err());
    }
}
