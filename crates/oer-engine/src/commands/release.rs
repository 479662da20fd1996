//! Release runs.
//!
//! A run walks every course owning metadata flagged for release, builds a
//! snapshot candidate for each releasable element and compare-and-inserts it
//! into the ledger. Every row inserted by one run shares one release number.
//!
//! Per course: a course without active course info is skipped
//! (`MissingPrerequisite`). Per element: failures are recorded and the run
//! continues. Courses are processed in order; a deadline stops the run
//! between courses.

#![allow(clippy::result_large_err)]

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use oer_core::errors::{ExError, ExErrorKind};
use oer_core::model::OverrideState;
use oer_core::model::{CourseInfo, Element, StoredMetadata};
use oer_core::rules::evaluate_requirements;
use oer_core::snapshot::{course_metadata_bundle, SnapshotCandidate};
use oer_core::{log_op_end, log_op_error, log_op_start, PluginRegistry, RequestContext};
use oer_store::errors::Result;
use oer_store::repo::{CourseInfoRepo, CourseRepo, MetadataRepo, SettingsRepo};
use oer_store::snapshot::{insert_if_changed, next_release_number, InsertOutcome, ReleaseNumber};
use rusqlite::Connection;

use super::listing::{collect_course_elements, ListingMode};

const RELEASE_OP: &str = "release_run";
const COURSE_OP: &str = "release_course";

#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    /// Timestamp written to every snapshot of the run
    pub now: DateTime<Utc>,
    /// Stop before starting another course once this instant has passed
    pub deadline: Option<Instant>,
    /// Limit the run to these courses
    pub courses: Option<Vec<i64>>,
}

impl Default for ReleaseOptions {
    fn default() -> Self {
        Self {
            now: Utc::now(),
            deadline: None,
            courses: None,
        }
    }
}

/// What happened to one course
#[derive(Debug, Clone, Default)]
pub struct CourseReleaseReport {
    pub course_id: i64,
    pub inserted: Vec<String>,
    pub unchanged: Vec<String>,
    /// Flagged records that no longer meet the requirements
    pub not_releasable: Vec<String>,
    pub notify_failures: Vec<String>,
    pub errors: Vec<ExError>,
    /// Set when the course was skipped as a whole
    pub skipped: Option<ExError>,
}

#[derive(Debug, Clone, Default)]
pub struct ReleaseReport {
    /// Number on this run's snapshots; the next free number if none were inserted
    pub release_number: i64,
    pub courses: Vec<CourseReleaseReport>,
    /// Set when the deadline stopped the run early
    pub timed_out: Option<ExError>,
}

impl ReleaseReport {
    pub fn inserted(&self) -> usize {
        self.courses.iter().map(|c| c.inserted.len()).sum()
    }
}

/// Run one release over all courses with flagged metadata.
///
/// ## Errors
///
/// Only store failures outside a single element abort the run.
pub fn run_release(
    conn: &mut Connection,
    registry: &PluginRegistry,
    ctx: &RequestContext,
    options: &ReleaseOptions,
) -> Result<ReleaseReport> {
    let start = Instant::now();
    log_op_start!(RELEASE_OP, request_id = %ctx.correlation.request_id);

    let mut report = ReleaseReport::default();
    // Claimed by the first insert of the run
    let mut release_number = ReleaseNumber::Allocate;

    let courses = match &options.courses {
        Some(ids) => ids.clone(),
        None => MetadataRepo::courses_with_release_flag(conn)?,
    };

    for course_id in courses {
        if options.deadline.is_some_and(|d| Instant::now() >= d) {
            let err = ExError::new(ExErrorKind::Timeout)
                .with_op(RELEASE_OP)
                .with_course_id(course_id)
                .with_message("deadline reached before all courses were released");
            log_op_error!(
                RELEASE_OP,
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            report.timed_out = Some(err);
            break;
        }
        let course_report =
            release_course(conn, registry, ctx, course_id, &mut release_number, options)?;
        report.courses.push(course_report);
    }

    report.release_number = match release_number {
        ReleaseNumber::Fixed(n) => n,
        ReleaseNumber::Allocate => next_release_number(conn)?,
    };

    log_op_end!(
        RELEASE_OP,
        duration_ms = start.elapsed().as_millis() as u64,
        release_number = report.release_number,
        snapshot_count = report.inserted()
    );
    Ok(report)
}

/// Run a release if the configured schedule says one is due.
///
/// Returns `None` when not due. The run time is recorded in settings.
pub fn run_scheduled_release(
    conn: &mut Connection,
    registry: &PluginRegistry,
    ctx: &RequestContext,
    options: &ReleaseOptions,
) -> Result<Option<ReleaseReport>> {
    let schedule = ctx
        .config
        .release_schedule()
        .map_err(|e| ExError::from(e).with_op(RELEASE_OP))?;
    let last_run = SettingsRepo::last_release_run(conn)?;
    if !schedule.is_due(options.now, last_run) {
        tracing::debug!(op = RELEASE_OP, "Release not due");
        return Ok(None);
    }
    let report = run_release(conn, registry, ctx, options)?;
    SettingsRepo::set_last_release_run(conn, options.now)?;
    Ok(Some(report))
}

fn release_course(
    conn: &mut Connection,
    registry: &PluginRegistry,
    ctx: &RequestContext,
    course_id: i64,
    release_number: &mut ReleaseNumber,
    options: &ReleaseOptions,
) -> Result<CourseReleaseReport> {
    let start = Instant::now();
    log_op_start!(COURSE_OP, course_id = course_id);

    let mut report = CourseReleaseReport {
        course_id,
        ..CourseReleaseReport::default()
    };

    let own_info = CourseInfoRepo::list_active_for_course(conn, course_id)?;
    if own_info.is_empty() {
        let err = ExError::new(ExErrorKind::MissingPrerequisite)
            .with_op(COURSE_OP)
            .with_course_id(course_id)
            .with_message("course has no active course metadata");
        log_op_error!(
            COURSE_OP,
            err.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            course_id = course_id
        );
        report.skipped = Some(err);
        return Ok(report);
    }

    let listing = collect_course_elements(conn, registry, ctx, course_id, ListingMode::Batch)?;
    report.errors.extend(listing.skipped);
    let required = ctx.config.required_fields();

    for element in &listing.elements {
        let identifier = element.identifier().to_string();
        let Some(record) = MetadataRepo::get_by_identifier(conn, &identifier)? else {
            continue;
        };
        // Released from the editor course only
        if record.course_id != course_id {
            continue;
        }

        let requirements = evaluate_requirements(&record, &required);
        if !requirements.releasable {
            if record.is_flagged_for_release() {
                let err = ExError::new(ExErrorKind::InconsistentState)
                    .with_op(COURSE_OP)
                    .with_identifier(identifier.as_str())
                    .with_course_id(course_id)
                    .with_message(format!(
                        "flagged for release but requirements missing: {}",
                        requirements.missing().join(", ")
                    ));
                log_op_error!(
                    COURSE_OP,
                    err,
                    duration_ms = start.elapsed().as_millis() as u64,
                    identifier = identifier.as_str()
                );
                report.not_releasable.push(identifier);
            }
            continue;
        }
        if !requirements.should_release {
            continue;
        }

        let candidate = match build_candidate(conn, registry, element, &own_info, &record) {
            Ok(candidate) => candidate,
            Err(err) => {
                report.errors.push(err);
                continue;
            }
        };

        match insert_if_changed(conn, &candidate, *release_number, options.now.timestamp()) {
            Ok(InsertOutcome::Inserted {
                release_number: number,
                ..
            }) => {
                *release_number = ReleaseNumber::Fixed(number);
                notify_source(registry, element, &mut report);
                report.inserted.push(identifier);
            }
            Ok(InsertOutcome::Unchanged { .. }) => report.unchanged.push(identifier),
            Err(err) => {
                log_op_error!(
                    COURSE_OP,
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    identifier = identifier.as_str()
                );
                report.errors.push(err);
            }
        }
    }

    log_op_end!(
        COURSE_OP,
        duration_ms = start.elapsed().as_millis() as u64,
        course_id = course_id,
        snapshot_count = report.inserted.len()
    );
    Ok(report)
}

/// Candidate for `element`: stored metadata, the course bundle after
/// overrides, and whatever the contributors add.
fn build_candidate(
    conn: &Connection,
    registry: &PluginRegistry,
    element: &Element,
    own_info: &[CourseInfo],
    record: &StoredMetadata,
) -> Result<SnapshotCandidate> {
    let overrides = match element.contenthash() {
        Some(hash) => CourseRepo::overrides_for(conn, hash)?,
        None => Vec::new(),
    };

    let mut available = BTreeMap::new();
    for rule in overrides.iter().filter(|o| o.state == OverrideState::Include) {
        if !available.contains_key(&rule.course_id) {
            let entries = CourseInfoRepo::list_active_for_course(conn, rule.course_id)?;
            available.insert(rule.course_id, entries);
        }
    }
    let course_metadata = course_metadata_bundle(own_info, &overrides, &available);

    let mut additional = Map::new();
    for contributor in registry.contributors() {
        if let Some(value) = contributor.release_data(record.course_id, element) {
            additional.insert(contributor.key().to_string(), value);
        }
    }

    Ok(SnapshotCandidate::build(
        element,
        record,
        course_metadata,
        Value::Object(additional),
    ))
}

/// Tell the origin plugin its element went out. A refusal is logged, not fatal.
fn notify_source(registry: &PluginRegistry, element: &Element, report: &mut CourseReleaseReport) {
    let accepted = registry
        .source(element.origin())
        .map(|plugin| plugin.set_element_to_release(element))
        .unwrap_or(false);
    if accepted {
        return;
    }
    let err = ExError::new(ExErrorKind::ExternalNotifyFailure)
        .with_op(COURSE_OP)
        .with_identifier(element.identifier())
        .with_course_id(report.course_id)
        .with_message(format!("source plugin {} did not accept release", element.origin()));
    tracing::warn!(
        op = COURSE_OP,
        identifier = element.identifier(),
        err_code = err.code(),
        "Release notification failed"
    );
    report.notify_failures.push(element.identifier().to_string());
    report.errors.push(err);
}
