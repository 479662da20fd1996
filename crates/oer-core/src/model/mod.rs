pub mod courseinfo;
pub mod element;
pub mod element_list;
pub mod license;
pub mod metadata;
pub mod snapshot;
pub mod state;

pub use courseinfo::{
    CourseInfo, CourseInfoField, CourseOverride, CustomFieldValue, LmsCourse, OverrideState,
};
pub use element::{Element, ElementType, Information, Person, StoredFileRef};
pub use element_list::{ElementField, ElementList};
pub use license::{License, LicenseRegistry};
pub use metadata::{MetadataEdit, ReleaseState, StoredMetadata};
pub use snapshot::SnapshotRecord;
pub use state::{CourseMembership, EditState, ElementState};
