//! OER Core - domain kernel of the OER element release engine
//!
//! This crate holds everything that does not touch storage:
//! - Element identifiers (compose, validate, decompose)
//! - Element and ElementList models with their field contracts
//! - State resolution, release requirements and course-info sync planning
//! - Snapshot candidates with their release hash
//! - Release document assembly for both application profiles
//! - Configuration, plugin seams, error and logging facilities

pub mod config;
pub mod context;
pub mod errors;
pub mod identifier;
pub mod logging_facility;
pub mod model;
pub mod plugin;
pub mod release;
pub mod rules;
pub mod snapshot;

pub use oer_core_types;

// Re-export commonly used types
pub use config::OerConfig;
pub use context::RequestContext;
pub use errors::{ExError, ExErrorKind, ExResult, OerError, Result};
pub use model::{Element, ElementList, ElementType};
pub use plugin::{PluginRegistry, SourcePlugin};
