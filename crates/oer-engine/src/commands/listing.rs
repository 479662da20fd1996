//! Course element listing.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use oer_core::errors::{ExError, ExErrorKind};
use oer_core::model::ElementList;
use oer_core::{log_op_end, log_op_error, log_op_start, PluginRegistry, RequestContext};
use oer_store::errors::Result;
use rusqlite::Connection;

use super::state::resolve_element_state;

/// Elements of one course with resolved states
#[derive(Debug, Clone, Default)]
pub struct CourseListing {
    pub course_id: i64,
    pub elements: ElementList,
    /// Elements left out because their state could not be resolved
    pub skipped: Vec<ExError>,
}

/// How a listing treats an element whose state fails to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    /// Skip recoverable failures; anything else fails the listing
    Interactive,
    /// Skip every per-element failure; only store errors fail the listing
    Batch,
}

impl ListingMode {
    fn skips(&self, err: &ExError) -> bool {
        match self {
            ListingMode::Interactive => err.kind().is_recoverable_in_batch(),
            ListingMode::Batch => !matches!(err.kind(), ExErrorKind::Persistence | ExErrorKind::Io),
        }
    }
}

/// Load, merge and resolve every element of `course_id`.
///
/// A recoverable resolution failure is logged and the element skipped; a
/// contract violation fails the listing.
pub fn list_course_elements(
    conn: &Connection,
    registry: &PluginRegistry,
    ctx: &RequestContext,
    course_id: i64,
) -> Result<CourseListing> {
    collect_course_elements(conn, registry, ctx, course_id, ListingMode::Interactive)
}

pub fn collect_course_elements(
    conn: &Connection,
    registry: &PluginRegistry,
    ctx: &RequestContext,
    course_id: i64,
    mode: ListingMode,
) -> Result<CourseListing> {
    let start = Instant::now();
    log_op_start!("list_course_elements", course_id = course_id);

    let mut listing = CourseListing {
        course_id,
        ..CourseListing::default()
    };

    for mut element in registry.load_elements(course_id) {
        match resolve_element_state(conn, ctx, &element, course_id) {
            Ok(state) => {
                element.set_state(state);
                listing.elements.add(element).map_err(ExError::from)?;
            }
            Err(err) if mode.skips(&err) => {
                log_op_error!(
                    "list_course_elements",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    identifier = element.identifier()
                );
                listing.skipped.push(err);
            }
            Err(err) => return Err(err),
        }
    }

    log_op_end!(
        "list_course_elements",
        duration_ms = start.elapsed().as_millis() as u64,
        element_count = listing.elements.len()
    );
    Ok(listing)
}
