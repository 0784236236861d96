//! DECT turns functional-requirement documents into QA test-case suites.
//!
//! The pipeline runs each requirement through eight LLM transformation steps
//! (atomic blocks → partitions → boundaries → test values → unified list →
//! deduped list → organized data → test cases), checkpointing every step to
//! disk so runs can resume, then combines all final-step checkpoints into one
//! test-suite artifact with a CSV export.

pub mod combine;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod store;
pub mod tasks;

pub use combine::{combine, CombineOutput, FinalTestSuite};
pub use config::{Dirs, LlmConfig, Provider};
pub use llm::{ChatModel, LlmClient};
pub use pipeline::{run_batch, ProgressTracker};
pub use store::{Checkpoint, StepStore};
pub use tasks::{load_tasks, Requirement, TaskSelection};
