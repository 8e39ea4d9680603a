//! The resumable sync-with-upstream workflow
//!
//! Split across three modules: the phase machine, the fresh-sync engine,
//! and the resume path.

mod engine;
mod phase;
mod resume;

pub use engine::{SyncEngine, SyncOutcome};
pub use phase::{PhaseTracker, SyncPhase};
pub use resume::ResumeOutcome;
