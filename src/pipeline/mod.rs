//! Pipeline execution: step runner, per-requirement sequencing, batch loop,
//! and the shared progress scalar.

pub mod orchestrator;
pub mod progress;
pub mod runner;

pub use orchestrator::{run_batch, run_requirement, BatchSummary};
pub use progress::{ProgressStatus, ProgressTracker};
pub use runner::StepRunner;
