//! Chatline LLM Service
//!
//! Provides chat completions with support for:
//! - OpenAI chat completions API integration for production
//! - Mock LLM service for testing
//! - Credential detection (absent or placeholder keys disable the client)

pub mod mock;
pub mod openai;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Model used for every completion request
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Completion token cap
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Marker found in the key shipped in sample `.env` files
pub const PLACEHOLDER_API_KEY: &str = "your_openai_api_key";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    #[error("LLM request error: {0}")]
    Request(String),

    #[error("LLM response error: {0}")]
    Response(String),

    #[error("LLM quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("LLM credentials rejected: {0}")]
    InvalidCredentials(String),

    #[error("LLM rate limit exceeded")]
    RateLimit,
}

/// Speaker of a message as the completion API understands it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    User,
    Assistant,
}

impl LlmRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmRole::User => "user",
            LlmRole::Assistant => "assistant",
        }
    }
}

/// One turn of conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

/// A completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model override; empty uses the service default
    pub model: String,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// A completion response
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub stop_reason: String,
}

/// LLM service configuration.
#[derive(Clone)]
pub struct LlmConfig {
    /// API key; `None` disables the real client
    pub api_key: Option<String>,
    /// Base URL override (tests, proxies)
    pub base_url: Option<String>,
    pub default_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            default_model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl LlmConfig {
    /// Config carrying only an API key, everything else defaulted.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// The API key when it is present and not a placeholder.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.contains(PLACEHOLDER_API_KEY))
    }
}

/// LLM service trait for different implementations.
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    /// Run a chat completion over the given history.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Model used when a request leaves `model` empty.
    fn default_model(&self) -> &str;
}

/// Factory for creating LlmService implementations.
pub struct LlmServiceFactory;

impl LlmServiceFactory {
    /// Create the OpenAI-backed service, or `None` when no usable credential
    /// is configured.
    pub fn create(config: LlmConfig) -> Option<Arc<dyn LlmService>> {
        if config.usable_api_key().is_none() {
            tracing::info!("No usable OpenAI API key configured, LLM client disabled");
            return None;
        }

        tracing::info!(model = %config.default_model, "Creating OpenAI LLM service");
        Some(Arc::new(openai::OpenAiService::new(config)))
    }
}
