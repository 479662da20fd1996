//! Release pull API.
//!
//! Answers pull requests from consumers with assembled JSON documents in the
//! negotiated application profile. Lookups that find nothing answer with an
//! `{"error": ...}` document instead of failing.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use serde_json::{json, Value};

use oer_core::errors::ExError;
use oer_core::identifier;
use oer_core::release::{
    latest_per_course_identifier, latest_per_identifier, release_response, ApplicationProfile,
    AssemblyContext,
};
use oer_core::{log_op_end, log_op_start, RequestContext};
use oer_store::errors::Result;
use oer_store::snapshot::{
    all_snapshots, by_release_number, for_course, history_for_identifier, release_dates,
};
use rusqlite::Connection;

const PULL_OP: &str = "pull_release";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullQuery {
    /// Every snapshot ever released for one element
    Identifier(String),
    /// Snapshots inserted by one release run
    Release(i64),
    /// Newest snapshot per course and element
    Latest,
    /// Newest snapshot per element of one course
    Course(i64),
    /// Release runs with their dates
    Dates,
}

/// Answer `query`. `profile_header` is a bare profile version or a content
/// type carrying `applicationprofile=`; without one the configured profile
/// is used.
///
/// ## Errors
///
/// Store failures and invalid configuration.
pub fn pull(
    conn: &Connection,
    ctx: &RequestContext,
    query: &PullQuery,
    profile_header: Option<&str>,
) -> Result<Value> {
    let start = Instant::now();
    log_op_start!(PULL_OP, query = ?query);

    let fallback = ctx
        .config
        .application_profile()
        .map_err(|e| ExError::from(e).with_op(PULL_OP))?;
    let profile = ApplicationProfile::negotiate(profile_header, fallback);
    let replacements = ctx
        .config
        .license_replacements()
        .map_err(|e| ExError::from(e).with_op(PULL_OP))?;
    let assembly = AssemblyContext {
        profile,
        licenses: &ctx.licenses,
        license_replacements: &replacements,
    };

    let response = match query {
        PullQuery::Identifier(id) => {
            if !identifier::validate(id) {
                error_document(format!("malformed identifier: {}", id))
            } else {
                let history = history_for_identifier(conn, id)?;
                if history.is_empty() {
                    error_document(format!("no release for identifier {}", id))
                } else {
                    release_response(&history, &assembly)
                }
            }
        }
        PullQuery::Release(number) => {
            let snapshots = by_release_number(conn, *number)?;
            if snapshots.is_empty() {
                error_document(format!("no release with number {}", number))
            } else {
                release_response(&snapshots, &assembly)
            }
        }
        PullQuery::Latest => {
            let latest = latest_per_course_identifier(all_snapshots(conn)?);
            release_response(&latest, &assembly)
        }
        PullQuery::Course(course_id) => {
            let latest = latest_per_identifier(for_course(conn, *course_id)?);
            release_response(&latest, &assembly)
        }
        PullQuery::Dates => {
            let releases: Vec<Value> = release_dates(conn)?
                .into_iter()
                .map(|d| {
                    json!({
                        "releasenumber": d.release_number,
                        "releasedate": d.time_created,
                        "count": d.snapshots,
                    })
                })
                .collect();
            json!({
                "applicationprofile": profile.version(),
                "releases": releases,
            })
        }
    };

    log_op_end!(PULL_OP, duration_ms = start.elapsed().as_millis() as u64);
    Ok(response)
}

fn error_document(message: String) -> Value {
    json!({ "error": message })
}
