//! CLI command implementations

pub mod post_merge;
pub mod sweep;
pub mod sync;

pub use post_merge::PostMergeArgs;
pub use sweep::SweepArgs;
pub use sync::{ResumeArgs, SyncArgs};
