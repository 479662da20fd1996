pub mod assembler;
pub mod profile;

pub use assembler::{
    assemble, latest_per_course_identifier, latest_per_identifier, release_response,
    AssemblyContext,
};
pub use profile::ApplicationProfile;
