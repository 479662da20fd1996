pub mod courseinfo_sync;
pub mod requirements;
pub mod state_resolver;

pub use courseinfo_sync::{plan as plan_courseinfo_sync, SyncPlan};
pub use requirements::{evaluate as evaluate_requirements, RequirementsResult};
pub use state_resolver::{resolve as resolve_state, EditorReassignment, Resolution, StateInputs};
