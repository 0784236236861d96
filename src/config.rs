//! Environment-driven configuration.
//!
//! Provider, model and credentials come from the process environment (with
//! `.env` support via dotenvy in the binary). An unknown provider is a setup
//! defect and aborts startup; everything else defaults sensibly.

use std::path::PathBuf;
use thiserror::Error;

/// Default location of per-step checkpoint files.
pub const DEFAULT_DATA_DIR: &str = "data/pdf_logbook";
/// Default location of the combined artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown LLM provider: {0} (expected anthropic, openai or ollama)")]
    UnknownProvider(String),

    #[error("Missing API key for provider {0}")]
    MissingApiKey(&'static str),
}

/// Which chat-completion backend to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAi,
    Ollama,
}

impl Provider {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::OpenAi),
            "ollama" => Ok(Provider::Ollama),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAi => "openai",
            Provider::Ollama => "ollama",
        }
    }
}

/// Resolved LLM settings for one run.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    pub api_key: String,
    /// Base URL for self-hosted backends (ollama).
    pub host: String,
}

impl LlmConfig {
    /// Read provider settings from the environment.
    ///
    /// `LLM_PROVIDER` selects the backend, `LLM_MODEL` the model id.
    /// Anthropic and OpenAI require their respective API keys; ollama only
    /// needs `OLLAMA_HOST` (default `http://localhost:11434`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider_raw = std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "anthropic".into());
        let provider = Provider::parse(&provider_raw)?;
        let model = std::env::var("LLM_MODEL")
            .unwrap_or_else(|_| default_model(provider).to_string());

        let api_key = match provider {
            Provider::Anthropic => std::env::var("ANTHROPIC_API_KEY")
                .map_err(|_| ConfigError::MissingApiKey("anthropic"))?,
            Provider::OpenAi => std::env::var("OPENAI_API_KEY")
                .map_err(|_| ConfigError::MissingApiKey("openai"))?,
            Provider::Ollama => String::new(),
        };

        let host = std::env::var("OLLAMA_HOST")
            .unwrap_or_else(|_| "http://localhost:11434".to_string());

        Ok(Self {
            provider,
            model,
            api_key,
            host,
        })
    }
}

fn default_model(provider: Provider) -> &'static str {
    match provider {
        Provider::Anthropic => "claude-sonnet-4-20250514",
        Provider::OpenAi => "gpt-4o-mini",
        Provider::Ollama => "llama3.1",
    }
}

/// Filesystem locations used by the pipeline and the combiner.
#[derive(Debug, Clone)]
pub struct Dirs {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for Dirs {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_providers() {
        assert_eq!(Provider::parse("anthropic").unwrap(), Provider::Anthropic);
        assert_eq!(Provider::parse("OpenAI").unwrap(), Provider::OpenAi);
        assert_eq!(Provider::parse("ollama").unwrap(), Provider::Ollama);
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = Provider::parse("gemini").unwrap_err();
        assert!(err.to_string().contains("gemini"));
    }
}
