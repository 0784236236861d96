//! Per-requirement step sequencing and the document/requirement batch loop.
//!
//! Everything here is deliberately sequential: one requirement at a time, one
//! step at a time, one blocking model call in flight. A step failure is
//! already absorbed into its checkpoint by the runner, so the loops only ever
//! see completion.

use crate::llm::ChatModel;
use crate::pipeline::progress::ProgressTracker;
use crate::pipeline::runner::StepRunner;
use crate::prompts::{step_spec, AVAILABLE_STEPS};
use crate::store::{StepStore, StoreError};
use crate::tasks::{Requirement, TaskSelection};
use uuid::Uuid;

/// Totals for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub documents: usize,
    pub requirements: usize,
}

/// Run a list of steps for one requirement, in ascending order.
///
/// Steps outside the catalog are skipped with a warning. Each step re-derives
/// its own input from the store, so any sub-range (or a single step) is
/// well-defined even when earlier steps ran in a previous process.
pub async fn run_requirement(
    store: &StepStore,
    model: &dyn ChatModel,
    progress: &ProgressTracker,
    document: &str,
    requirement: &Requirement,
    steps: &[u8],
) -> Result<(), StoreError> {
    store.ensure_cell_dir(document, &requirement.id)?;

    tracing::info!(
        "Starting pipeline for {} - {}: {}...",
        document,
        requirement.id,
        preview(&requirement.text)
    );

    let runner = StepRunner::new(store, model);
    for &step_number in steps {
        if !AVAILABLE_STEPS.contains(&step_number) {
            tracing::warn!("Step {} is not available. Skipping.", step_number);
            continue;
        }
        let spec = step_spec(step_number);
        progress.step_started(document, &requirement.id, step_number, spec.name);
        runner
            .run(document, &requirement.id, &requirement.text, step_number)
            .await?;
    }

    progress.announce(format!(
        "Pipeline completed for {} - {}",
        document, requirement.id
    ));
    Ok(())
}

/// Run the full pipeline for every requirement of every document, in the
/// order the tasks file gave them. One requirement's failures never block
/// the next: there is no fail-fast path here.
pub async fn run_batch(
    store: &StepStore,
    model: &dyn ChatModel,
    progress: &ProgressTracker,
    tasks: &TaskSelection,
    steps: &[u8],
) -> Result<BatchSummary, StoreError> {
    let run_id = Uuid::new_v4();
    tracing::info!(%run_id, "starting batch of {} documents", tasks.len());

    let mut summary = BatchSummary::default();
    for document_tasks in tasks {
        tracing::info!(
            "=== Starting pipeline for {} ({} requirements) ===",
            document_tasks.document,
            document_tasks.requirements.len()
        );

        for requirement in &document_tasks.requirements {
            run_requirement(
                store,
                model,
                progress,
                &document_tasks.document,
                requirement,
                steps,
            )
            .await?;
            summary.requirements += 1;
        }
        summary.documents += 1;
    }

    progress.announce(format!(
        "All tasks completed: {} documents, {} requirements",
        summary.documents, summary.requirements
    ));
    Ok(summary)
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(50) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{ChatCompletion, Usage};
    use crate::llm::LlmError;
    use crate::tasks::DocumentTasks;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tempfile::TempDir;

    /// Replies with a minimal valid object and records call order.
    struct SequenceModel {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatModel for SequenceModel {
        async fn complete(&self, _system: &str, user: &str) -> Result<ChatCompletion, LlmError> {
            self.calls.lock().push(user.lines().next().unwrap_or("").to_string());
            Ok(ChatCompletion {
                text: r#"{"fr_id": "FR-1", "atomic_blocks": []}"#.to_string(),
                usage: Usage::default(),
            })
        }
    }

    /// Fails every call; the batch must still visit every cell.
    struct AlwaysFailing;

    #[async_trait]
    impl ChatModel for AlwaysFailing {
        async fn complete(&self, _system: &str, _user: &str) -> Result<ChatCompletion, LlmError> {
            Err(LlmError::ApiError("provider unavailable".to_string()))
        }
    }

    fn selection(documents: &[(&str, &[&str])]) -> TaskSelection {
        documents
            .iter()
            .map(|(document, frs)| DocumentTasks {
                document: document.to_string(),
                requirements: frs
                    .iter()
                    .map(|id| Requirement {
                        id: id.to_string(),
                        text: "Name must be 2-25 Latin characters".to_string(),
                    })
                    .collect(),
            })
            .collect()
    }

    #[tokio::test]
    async fn runs_all_steps_for_all_requirements() {
        let dir = TempDir::new().unwrap();
        let store = StepStore::new(dir.path());
        let model = SequenceModel {
            calls: Mutex::new(Vec::new()),
        };
        let progress = ProgressTracker::new();
        let tasks = selection(&[("signup.pdf", &["FR-1"]), ("checkout.pdf", &["FR-1", "FR-2"])]);

        let summary = run_batch(&store, &model, &progress, &tasks, &AVAILABLE_STEPS)
            .await
            .unwrap();

        assert_eq!(
            summary,
            BatchSummary {
                documents: 2,
                requirements: 3
            }
        );
        assert_eq!(model.calls.lock().len(), 24);
        for step in AVAILABLE_STEPS {
            assert!(store.read("signup.pdf", "FR-1", step).is_some());
            assert!(store.read("checkout.pdf", "FR-2", step).is_some());
        }
        assert!(progress.current().message.contains("3 requirements"));
    }

    #[tokio::test]
    async fn failures_do_not_halt_the_batch() {
        let dir = TempDir::new().unwrap();
        let store = StepStore::new(dir.path());
        let progress = ProgressTracker::new();
        let tasks = selection(&[("signup.pdf", &["FR-1", "FR-2"])]);

        let summary = run_batch(&store, &AlwaysFailing, &progress, &tasks, &AVAILABLE_STEPS)
            .await
            .unwrap();

        assert_eq!(summary.requirements, 2);
        for fr in ["FR-1", "FR-2"] {
            for step in AVAILABLE_STEPS {
                let checkpoint = store.read("signup.pdf", fr, step).unwrap();
                assert!(checkpoint.error.is_some());
            }
        }
    }

    #[tokio::test]
    async fn unavailable_steps_are_skipped() {
        let dir = TempDir::new().unwrap();
        let store = StepStore::new(dir.path());
        let model = SequenceModel {
            calls: Mutex::new(Vec::new()),
        };
        let progress = ProgressTracker::new();
        let requirement = Requirement {
            id: "FR-1".to_string(),
            text: "Name must be 2-25 Latin characters".to_string(),
        };

        run_requirement(&store, &model, &progress, "signup.pdf", &requirement, &[3, 9])
            .await
            .unwrap();

        assert!(store.read("signup.pdf", "FR-1", 3).is_some());
        assert_eq!(model.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn single_step_rerun_is_well_defined() {
        let dir = TempDir::new().unwrap();
        let store = StepStore::new(dir.path());
        let model = SequenceModel {
            calls: Mutex::new(Vec::new()),
        };
        let progress = ProgressTracker::new();
        let requirement = Requirement {
            id: "FR-1".to_string(),
            text: "Name must be 2-25 Latin characters".to_string(),
        };

        // No steps 1-4 have ever run; step 5 still executes on fallback input.
        run_requirement(&store, &model, &progress, "signup.pdf", &requirement, &[5])
            .await
            .unwrap();

        let checkpoint = store.read("signup.pdf", "FR-1", 5).unwrap();
        assert!(checkpoint.is_success());
        assert_eq!(
            checkpoint.input_data,
            serde_json::json!({"requirement_text": requirement.text})
        );
    }
}
