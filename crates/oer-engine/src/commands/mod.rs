//! Engine operations.
//!
//! Each function takes the database connection and a `RequestContext`
//! explicitly and returns `oer_store::errors::Result`.

pub mod courseinfo;
pub mod listing;
pub mod metadata;
pub mod pull;
pub mod release;
pub mod requirements;
pub mod state;

pub use courseinfo::{
    edit_courseinfo_field, set_courseinfo_ignored, sync_all_courses, sync_course, SyncReport,
};
pub use listing::{collect_course_elements, list_course_elements, CourseListing, ListingMode};
pub use metadata::{edit_metadata, validate_edit};
pub use pull::{pull, PullQuery};
pub use release::{
    run_release, run_scheduled_release, CourseReleaseReport, ReleaseOptions, ReleaseReport,
};
pub use requirements::{check_requirements, reconcile_release_flags, ReconcileReport};
pub use state::resolve_element_state;
