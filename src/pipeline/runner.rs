//! Single-step execution: resolve input, render the prompt, call the model,
//! persist the outcome. Every outcome is a checkpoint write; model and parse
//! failures never propagate past the runner.

use crate::llm::client::coerce_json;
use crate::llm::ChatModel;
use crate::prompts::template::{render, render_literal};
use crate::prompts::{step_spec, StepSpec};
use crate::store::{Checkpoint, RenderedPrompt, StepStore, StoreError};
use serde_json::json;

/// Runs individual pipeline steps against one store and one model.
pub struct StepRunner<'a> {
    store: &'a StepStore,
    model: &'a dyn ChatModel,
}

impl<'a> StepRunner<'a> {
    pub fn new(store: &'a StepStore, model: &'a dyn ChatModel) -> Self {
        Self { store, model }
    }

    /// Execute one step for one requirement.
    ///
    /// Unknown step numbers panic via the catalog lookup; everything that can
    /// fail at runtime (model call, response parsing) lands in the checkpoint
    /// instead of the return value. Only storage I/O propagates.
    pub async fn run(
        &self,
        document: &str,
        fr_id: &str,
        fr_text: &str,
        step_number: u8,
    ) -> Result<(), StoreError> {
        let spec = step_spec(step_number);

        let input_data = self.prepare_step_input(document, fr_id, fr_text, step_number);
        let serialized_input = serde_json::to_string_pretty(&input_data)
            .unwrap_or_else(|_| input_data.to_string());

        let prompt = RenderedPrompt {
            system: render_literal(&spec.system_prompt),
            user: render(&spec.user_template, spec.input_key, &serialized_input),
        };

        let checkpoint = match self.invoke(spec, &prompt).await {
            Ok(response) => Checkpoint::success(
                prompt,
                input_data,
                response,
                fr_id,
                fr_text,
                step_number,
            ),
            Err(message) => {
                tracing::warn!(
                    "step {} failed for {} - {}: {}",
                    step_number,
                    document,
                    fr_id,
                    message
                );
                Checkpoint::failure(prompt, input_data, message, fr_id, fr_text, step_number)
            }
        };

        self.store.write(document, fr_id, step_number, &checkpoint)?;
        tracing::info!("Completed step {} for {} - {}", step_number, document, fr_id);
        Ok(())
    }

    async fn invoke(
        &self,
        spec: &StepSpec,
        prompt: &RenderedPrompt,
    ) -> Result<serde_json::Value, String> {
        let completion = self
            .model
            .complete(&prompt.system, &prompt.user)
            .await
            .map_err(|e| e.to_string())?;

        let response = coerce_json(&completion.text).map_err(|e| e.to_string())?;

        if response.get(spec.output_field).is_none() {
            tracing::debug!(
                "step {} response has no '{}' field; keeping it anyway",
                spec.number,
                spec.output_field
            );
        }

        Ok(response)
    }

    /// Resolve a step's input with the shared three-tier fallback chain:
    /// previous step's successful response, else the previous step's recorded
    /// input, else the original requirement text. Step 1 always starts from
    /// the requirement text.
    pub fn prepare_step_input(
        &self,
        document: &str,
        fr_id: &str,
        fr_text: &str,
        step_number: u8,
    ) -> serde_json::Value {
        if step_number == 1 {
            return json!({ "requirement_text": fr_text });
        }

        let previous = step_number - 1;
        if let Some(checkpoint) = self.store.read(document, fr_id, previous) {
            if let Some(response) = checkpoint.llm_response {
                return response;
            }
            tracing::debug!(
                "step {} has no response for {} - {}; reusing its input",
                previous,
                document,
                fr_id
            );
            return checkpoint.input_data;
        }

        tracing::debug!(
            "no step {} checkpoint for {} - {}; falling back to requirement text",
            previous,
            document,
            fr_id
        );
        json!({ "requirement_text": fr_text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{ChatCompletion, Usage};
    use crate::llm::LlmError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use tempfile::TempDir;

    struct StubModel {
        response: String,
    }

    #[async_trait]
    impl ChatModel for StubModel {
        async fn complete(&self, _system: &str, _user: &str) -> Result<ChatCompletion, LlmError> {
            Ok(ChatCompletion {
                text: self.response.clone(),
                usage: Usage::default(),
            })
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        async fn complete(&self, _system: &str, _user: &str) -> Result<ChatCompletion, LlmError> {
            Err(LlmError::ApiError("request timed out".to_string()))
        }
    }

    /// Records prompts and replies with a fixed object.
    struct RecordingModel {
        calls: Mutex<Vec<(String, String)>>,
        response: String,
    }

    #[async_trait]
    impl ChatModel for RecordingModel {
        async fn complete(&self, system: &str, user: &str) -> Result<ChatCompletion, LlmError> {
            self.calls
                .lock()
                .push((system.to_string(), user.to_string()));
            Ok(ChatCompletion {
                text: self.response.clone(),
                usage: Usage::default(),
            })
        }
    }

    const FR_TEXT: &str = "Name must be 2-25 Latin characters";

    #[tokio::test]
    async fn success_writes_response_and_no_error() {
        let dir = TempDir::new().unwrap();
        let store = StepStore::new(dir.path());
        let model = StubModel {
            response: r#"{"fr_id": "FR-1", "atomic_blocks": [{"id": "AB-1", "description": "Latin only"}]}"#.to_string(),
        };

        StepRunner::new(&store, &model)
            .run("signup.pdf", "FR-1", FR_TEXT, 1)
            .await
            .unwrap();

        let checkpoint = store.read("signup.pdf", "FR-1", 1).unwrap();
        assert!(checkpoint.llm_response.is_some());
        assert!(checkpoint.error.is_none());
        assert_eq!(checkpoint.input_data, json!({"requirement_text": FR_TEXT}));
        assert!(checkpoint.prompt.user.contains(FR_TEXT));
    }

    #[tokio::test]
    async fn model_failure_writes_error_checkpoint_and_continues() {
        let dir = TempDir::new().unwrap();
        let store = StepStore::new(dir.path());

        let result = StepRunner::new(&store, &FailingModel)
            .run("signup.pdf", "FR-1", FR_TEXT, 3)
            .await;
        assert!(result.is_ok());

        let checkpoint = store.read("signup.pdf", "FR-1", 3).unwrap();
        assert!(checkpoint.llm_response.is_none());
        assert_eq!(checkpoint.error.as_deref(), Some("API error: request timed out"));
    }

    #[tokio::test]
    async fn malformed_response_is_recorded_as_error() {
        let dir = TempDir::new().unwrap();
        let store = StepStore::new(dir.path());
        let model = StubModel {
            response: "sure, here are the partitions you asked for".to_string(),
        };

        StepRunner::new(&store, &model)
            .run("signup.pdf", "FR-1", FR_TEXT, 2)
            .await
            .unwrap();

        let checkpoint = store.read("signup.pdf", "FR-1", 2).unwrap();
        assert!(checkpoint.llm_response.is_none());
        assert!(checkpoint.error.unwrap().contains("JSON"));
    }

    #[tokio::test]
    async fn prior_success_is_passed_through_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = StepStore::new(dir.path());
        let step1_response = json!({
            "fr_id": "FR-1",
            "atomic_blocks": [{"id": "AB-1", "description": "Only Latin letters"}]
        });
        let model = StubModel {
            response: r#"{"fr_id": "FR-1", "atomic_blocks": []}"#.to_string(),
        };
        StepRunner::new(&store, &model)
            .run("signup.pdf", "FR-1", FR_TEXT, 1)
            .await
            .unwrap();
        let mut checkpoint = store.read("signup.pdf", "FR-1", 1).unwrap();
        checkpoint.llm_response = Some(step1_response.clone());
        store.write("signup.pdf", "FR-1", 1, &checkpoint).unwrap();

        let recorder = RecordingModel {
            calls: Mutex::new(Vec::new()),
            response: r#"{"fr_id": "FR-1", "partitions": []}"#.to_string(),
        };
        let runner = StepRunner::new(&store, &recorder);

        let input = runner.prepare_step_input("signup.pdf", "FR-1", FR_TEXT, 2);
        assert_eq!(input, step1_response);

        runner.run("signup.pdf", "FR-1", FR_TEXT, 2).await.unwrap();
        let calls = recorder.calls.lock();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.contains("\"AB-1\""));
    }

    #[tokio::test]
    async fn failed_prior_step_passes_its_input_through() {
        let dir = TempDir::new().unwrap();
        let store = StepStore::new(dir.path());
        let step2_response = json!({"fr_id": "FR-1", "partitions": [{"atomic_block_id": "AB-1", "valid": [], "invalid": []}]});

        let checkpoint = Checkpoint::failure(
            RenderedPrompt {
                system: String::new(),
                user: String::new(),
            },
            step2_response.clone(),
            "request timed out".to_string(),
            "FR-1",
            FR_TEXT,
            3,
        );
        store.write("signup.pdf", "FR-1", 3, &checkpoint).unwrap();

        let model = FailingModel;
        let runner = StepRunner::new(&store, &model);
        let input = runner.prepare_step_input("signup.pdf", "FR-1", FR_TEXT, 4);
        assert_eq!(input, step2_response);
    }

    #[tokio::test]
    async fn step_after_isolated_failure_falls_back_to_requirement_text() {
        let dir = TempDir::new().unwrap();
        let store = StepStore::new(dir.path());

        // Step 3 run in isolation: no upstream checkpoints, model times out.
        StepRunner::new(&store, &FailingModel)
            .run("signup.pdf", "FR-1", FR_TEXT, 3)
            .await
            .unwrap();
        let step3 = store.read("signup.pdf", "FR-1", 3).unwrap();
        assert!(step3.error.is_some());

        let model = StubModel {
            response: r#"{"fr_id": "FR-1", "test_values": []}"#.to_string(),
        };
        let runner = StepRunner::new(&store, &model);
        let input = runner.prepare_step_input("signup.pdf", "FR-1", FR_TEXT, 4);
        assert_eq!(input, json!({"requirement_text": FR_TEXT}));
    }

    #[tokio::test]
    async fn missing_prior_checkpoint_falls_back_to_requirement_text() {
        let dir = TempDir::new().unwrap();
        let store = StepStore::new(dir.path());
        let model = StubModel {
            response: r#"{"fr_id": "FR-1", "values": []}"#.to_string(),
        };
        let runner = StepRunner::new(&store, &model);

        let input = runner.prepare_step_input("signup.pdf", "FR-1", FR_TEXT, 5);
        assert_eq!(input, json!({"requirement_text": FR_TEXT}));
    }
}
