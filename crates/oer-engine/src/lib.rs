//! OER Engine - orchestration over the store
//!
//! Coordinates the domain rules of `oer-core` with the persistence of
//! `oer-store`: element listing with state resolution, metadata edits,
//! course-info sync, release runs and the release pull API.

pub mod commands;

pub use commands::{
    edit_metadata, list_course_elements, pull, reconcile_release_flags, run_release,
    run_scheduled_release, sync_course, PullQuery, ReleaseOptions, ReleaseReport,
};
