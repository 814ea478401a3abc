//! OpenAI Chat Completions Implementation
//!
//! Calls the OpenAI chat completions API (https://api.openai.com/v1/chat/completions)
//! using reqwest HTTP client.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{CompletionRequest, CompletionResponse, LlmConfig, LlmError, LlmService};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Chat completions request body
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<MessageBody>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct MessageBody {
    role: &'static str,
    content: String,
}

/// Chat completions response body
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    model: String,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: i32,
    completion_tokens: i32,
}

/// OpenAI API error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
}

impl ApiError {
    fn mentions(&self, needle: &str) -> bool {
        self.code.as_deref() == Some(needle)
            || self.error_type.as_deref() == Some(needle)
            || self.message.contains(needle)
    }
}

/// OpenAI LLM service implementation
pub struct OpenAiService {
    client: Client,
    config: LlmConfig,
    base_url: String,
}

impl OpenAiService {
    /// Create a new OpenAI service
    pub fn new(config: LlmConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            client: Client::new(),
            config,
            base_url,
        }
    }
}

/// Map a non-success response onto the error categories callers act on.
fn classify_failure(status: StatusCode, body: &str) -> LlmError {
    let api_error = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|r| r.error);

    match (status, api_error) {
        (StatusCode::TOO_MANY_REQUESTS, Some(err)) if err.mentions("insufficient_quota") => {
            LlmError::QuotaExceeded(err.message)
        }
        (StatusCode::TOO_MANY_REQUESTS, Some(err)) if err.message.contains("quota") => {
            LlmError::QuotaExceeded(err.message)
        }
        (StatusCode::TOO_MANY_REQUESTS, _) => LlmError::RateLimit,
        (StatusCode::UNAUTHORIZED, Some(err)) => LlmError::InvalidCredentials(err.message),
        (StatusCode::UNAUTHORIZED, None) => LlmError::InvalidCredentials(body.to_string()),
        (_, Some(err)) if err.mentions("invalid_api_key") => {
            LlmError::InvalidCredentials(err.message)
        }
        (_, Some(err)) if err.mentions("insufficient_quota") => {
            LlmError::QuotaExceeded(err.message)
        }
        (_, Some(err)) => LlmError::Response(format!(
            "OpenAI API error ({}): {}",
            err.error_type.as_deref().unwrap_or("unknown"),
            err.message
        )),
        (_, None) => LlmError::Response(format!("OpenAI API returned {}: {}", status, body)),
    }
}

#[async_trait::async_trait]
impl LlmService for OpenAiService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let api_key = self
            .config
            .usable_api_key()
            .ok_or_else(|| LlmError::Configuration("OPENAI_API_KEY is not set".to_string()))?;

        let model = if request.model.is_empty() {
            self.config.default_model.clone()
        } else {
            request.model
        };

        let max_tokens = request.max_tokens.unwrap_or(self.config.max_tokens);
        let temperature = request.temperature.unwrap_or(self.config.temperature);

        let messages: Vec<MessageBody> = request
            .messages
            .into_iter()
            .map(|m| MessageBody {
                role: m.role.as_str(),
                content: m.content,
            })
            .collect();

        let body = ChatCompletionRequest {
            model: model.clone(),
            messages,
            max_tokens,
            temperature,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);

        tracing::debug!(model = %model, max_tokens = %max_tokens, "Sending OpenAI API request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            return Err(classify_failure(status, &error_body));
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Response(format!("Failed to parse response: {}", e)))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Response("No choices in response".to_string()))?;

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LlmError::Response("Empty completion".to_string()))?;

        let (input_tokens, output_tokens) = api_response
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        Ok(CompletionResponse {
            content,
            model: api_response.model,
            input_tokens,
            output_tokens,
            stop_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
        })
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}
