use crate::config::{LlmConfig, Provider};
use crate::llm::pricing::estimate_cost;
use crate::llm::types::{
    AnthropicRequest, AnthropicResponse, ChatCompletion, Message, OllamaRequest, OllamaResponse,
    OpenAiRequest, OpenAiResponse, ResponseFormat, Usage,
};
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Upper bound for one step's structured output.
const MAX_TOKENS: u32 = 4096;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Response is not a JSON object: {0}")]
    MalformedJson(String),
}

/// The surface every step sees: a system prompt and a user prompt in, raw
/// text out. Implemented by [`LlmClient`] for real providers and by test
/// stubs for the pipeline tests.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<ChatCompletion, LlmError>;
}

/// Chat client for the configured provider.
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        tracing::info!(
            provider = config.provider.name(),
            model = %config.model,
            "initializing LLM client"
        );
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn complete_anthropic(
        &self,
        system: &str,
        user: &str,
    ) -> Result<ChatCompletion, LlmError> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message::user(user)],
            system: Some(system.to_string()),
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(LlmError::ApiError(error_text));
        }

        let body: AnthropicResponse = response.json().await?;
        let text = body
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(ChatCompletion {
            text,
            usage: body.usage,
        })
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<ChatCompletion, LlmError> {
        let request = OpenAiRequest {
            model: self.config.model.clone(),
            messages: vec![Message::system(system), Message::user(user)],
            response_format: ResponseFormat::json_object(),
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(LlmError::ApiError(error_text));
        }

        let body: OpenAiResponse = response.json().await?;
        let text = body
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or(LlmError::EmptyResponse)?;

        Ok(ChatCompletion {
            text,
            usage: body.usage.into(),
        })
    }

    async fn complete_ollama(&self, system: &str, user: &str) -> Result<ChatCompletion, LlmError> {
        let request = OllamaRequest {
            model: self.config.model.clone(),
            messages: vec![Message::system(system), Message::user(user)],
            stream: false,
            format: "json",
        };

        let url = format!("{}/api/chat", self.config.host.trim_end_matches('/'));
        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(LlmError::ApiError(error_text));
        }

        let body: OllamaResponse = response.json().await?;
        let text = body.message.content.ok_or(LlmError::EmptyResponse)?;

        Ok(ChatCompletion {
            text,
            usage: Usage {
                input_tokens: body.prompt_eval_count,
                output_tokens: body.eval_count,
            },
        })
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, system: &str, user: &str) -> Result<ChatCompletion, LlmError> {
        let completion = match self.config.provider {
            Provider::Anthropic => self.complete_anthropic(system, user).await?,
            Provider::OpenAi => self.complete_openai(system, user).await?,
            Provider::Ollama => self.complete_ollama(system, user).await?,
        };

        if let Some(cost) = estimate_cost(&self.config.model, &completion.usage) {
            tracing::debug!(
                input_tokens = completion.usage.input_tokens,
                output_tokens = completion.usage.output_tokens,
                cost_usd = cost,
                "model call completed"
            );
        }

        Ok(completion)
    }
}

/// Coerce raw model output into one JSON object.
///
/// A ```json fence around the object is tolerated and stripped; anything
/// that does not then parse as a JSON object is rejected.
pub fn coerce_json(text: &str) -> Result<serde_json::Value, LlmError> {
    let mut trimmed = text.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        trimmed = rest.strip_suffix("```").unwrap_or(rest).trim();
    }

    let value: serde_json::Value = serde_json::from_str(trimmed)
        .map_err(|e| LlmError::MalformedJson(e.to_string()))?;

    if !value.is_object() {
        return Err(LlmError::MalformedJson(format!(
            "expected an object, got: {}",
            truncate(trimmed, 80)
        )));
    }

    Ok(value)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
