//! Release requirement checks against stored metadata.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use oer_core::errors::{ExError, ExErrorKind};
use oer_core::model::ReleaseState;
use oer_core::rules::{evaluate_requirements, RequirementsResult};
use oer_core::{log_op_end, log_op_error, log_op_start, PluginRegistry, RequestContext};
use oer_store::errors::Result;
use oer_store::repo::MetadataRepo;
use rusqlite::Connection;

const RECONCILE_OP: &str = "reconcile_release_flags";

/// Evaluate the configured requirements for one stored record.
///
/// ## Errors
///
/// `NotFound` when no metadata is stored for `identifier`.
pub fn check_requirements(
    conn: &Connection,
    ctx: &RequestContext,
    identifier: &str,
) -> Result<RequirementsResult> {
    let record = MetadataRepo::get_by_identifier(conn, identifier)?.ok_or_else(|| {
        ExError::new(ExErrorKind::NotFound)
            .with_op("check_requirements")
            .with_identifier(identifier)
            .with_message("no stored metadata for element")
    })?;
    Ok(evaluate_requirements(&record, &ctx.config.required_fields()))
}

#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Identifiers whose release flag was cleared
    pub demoted: Vec<String>,
    pub notify_failures: Vec<ExError>,
}

/// Clear the release flag of every record that no longer meets the
/// requirements, for instance after the required field list grew.
///
/// Editors are told through the registered notifier; a failed notification
/// is logged and the flag stays cleared.
pub fn reconcile_release_flags(
    conn: &Connection,
    registry: &PluginRegistry,
    ctx: &RequestContext,
) -> Result<ReconcileReport> {
    let start = Instant::now();
    log_op_start!(RECONCILE_OP, request_id = %ctx.correlation.request_id);

    let required = ctx.config.required_fields();
    let mut report = ReconcileReport::default();

    for record in MetadataRepo::list_flagged_for_release(conn)? {
        let result = evaluate_requirements(&record, &required);
        if result.releasable {
            continue;
        }
        MetadataRepo::set_release_state(conn, record.id, ReleaseState::None)?;
        tracing::info!(
            op = RECONCILE_OP,
            identifier = record.identifier.as_str(),
            course_id = record.course_id,
            missing = ?result.missing(),
            "Release flag cleared"
        );

        if let Some(notifier) = registry.notifier() {
            if let Err(err) =
                notifier.release_revoked(record.course_id, &record.identifier, &result.missing())
            {
                let err = err
                    .with_op(RECONCILE_OP)
                    .with_identifier(record.identifier.as_str());
                log_op_error!(
                    RECONCILE_OP,
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    identifier = record.identifier.as_str()
                );
                report.notify_failures.push(err);
            }
        }
        report.demoted.push(record.identifier);
    }

    log_op_end!(
        RECONCILE_OP,
        duration_ms = start.elapsed().as_millis() as u64,
        demoted = report.demoted.len()
    );
    Ok(report)
}
