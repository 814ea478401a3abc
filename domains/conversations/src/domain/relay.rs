//! Chat relay: turns a message history into a single reply
//!
//! The relay is stateless. With a configured LLM client it forwards the
//! history to the completion API; without one, or when the call fails for
//! any reason, it answers with a canned reply picked deterministically from
//! the length of the last message and attaches a note saying why.

use std::sync::Arc;

use chatline_llm::{CompletionRequest, LlmError, LlmMessage, LlmRole, LlmService};
use serde::Serialize;

use super::entities::{Message, Sender};

/// Canned replies, indexed by `len(last message text) % len`
pub const MOCK_REPLIES: [&str; 8] = [
    "Hello! I'm a stand-in assistant. Configure an OpenAI API key to get real answers.",
    "This is a test reply. Add a valid OpenAI API key to the server's .env file for real responses.",
    "I'm here to help! The server is running in demo mode until an API key is set up.",
    "Thanks for your message! Everything is wired up, the AI service just needs configuring.",
    "Good question! This placeholder answer will be replaced once the OpenAI integration is live.",
    "The chat interface works end to end. This demo reply stands in until the API key is configured.",
    "Looks like you're trying the app out. Frontend and backend are both responding normally!",
    "Demo reply: the application is fully functional and ready for a real language model.",
];

/// Why the relay answered with a canned reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// No usable credential; the external API was never called
    NotConfigured,
    QuotaExceeded,
    InvalidCredentials,
    RateLimited,
    /// Transport failures, unexpected responses, empty completions
    Unavailable,
}

impl FailureCategory {
    /// User-visible explanation attached to the reply
    pub fn note(&self) -> &'static str {
        match self {
            Self::NotConfigured => {
                "Running in demo mode. Update your OpenAI API key for real AI responses."
            }
            Self::QuotaExceeded => {
                "OpenAI API quota exceeded. Running in demo mode. Please check your OpenAI billing."
            }
            Self::InvalidCredentials => {
                "Invalid OpenAI API key. Running in demo mode. Please check your OpenAI configuration."
            }
            Self::RateLimited => {
                "OpenAI rate limit reached. Running in demo mode. Please wait a moment and try again."
            }
            Self::Unavailable => {
                "Error occurred. Running in demo mode. Please check your configuration."
            }
        }
    }
}

impl From<&LlmError> for FailureCategory {
    fn from(err: &LlmError) -> Self {
        match err {
            LlmError::QuotaExceeded(_) => Self::QuotaExceeded,
            LlmError::InvalidCredentials(_) => Self::InvalidCredentials,
            LlmError::RateLimit => Self::RateLimited,
            LlmError::Configuration(_) => Self::NotConfigured,
            LlmError::Request(_) | LlmError::Response(_) => Self::Unavailable,
        }
    }
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "not_configured"),
            Self::QuotaExceeded => write!(f, "quota_exceeded"),
            Self::InvalidCredentials => write!(f, "invalid_credentials"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// What the relay hands back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayReply {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RelayReply {
    fn fallback(last_text: &str, category: FailureCategory) -> Self {
        Self {
            reply: mock_reply(last_text).to_string(),
            note: Some(category.note().to_string()),
        }
    }
}

/// Pick the canned reply for a message text.
///
/// Length is counted in characters, so the choice does not depend on how
/// the text happens to be encoded.
pub fn mock_reply(text: &str) -> &'static str {
    MOCK_REPLIES[text.chars().count() % MOCK_REPLIES.len()]
}

/// Map a stored sender onto the completion API's roles
fn llm_role(sender: Sender) -> LlmRole {
    match sender {
        Sender::User => LlmRole::User,
        Sender::Ai | Sender::System => LlmRole::Assistant,
    }
}

/// Stateless relay between a message history and the completion API
#[derive(Clone)]
pub struct ChatRelay {
    llm: Option<Arc<dyn LlmService>>,
}

impl ChatRelay {
    /// Create a relay; `None` runs it permanently in demo mode
    pub fn new(llm: Option<Arc<dyn LlmService>>) -> Self {
        Self { llm }
    }

    /// Relay that never calls out
    pub fn demo() -> Self {
        Self { llm: None }
    }

    /// Whether a real completion client is configured
    pub fn is_live(&self) -> bool {
        self.llm.is_some()
    }

    /// Produce a reply for the history. Never fails: every error path ends
    /// in a canned reply with an explanatory note.
    pub async fn relay(&self, messages: &[Message]) -> RelayReply {
        let last_text = messages.last().map(|m| m.text.as_str()).unwrap_or("");

        let Some(llm) = &self.llm else {
            tracing::debug!(
                message_count = messages.len(),
                "No LLM client configured, answering in demo mode"
            );
            return RelayReply::fallback(last_text, FailureCategory::NotConfigured);
        };

        let request = CompletionRequest {
            model: llm.default_model().to_string(),
            messages: messages
                .iter()
                .map(|m| LlmMessage {
                    role: llm_role(m.sender),
                    content: m.text.clone(),
                })
                .collect(),
            max_tokens: None,
            temperature: None,
        };

        match llm.complete(request).await {
            Ok(response) if !response.content.trim().is_empty() => {
                tracing::debug!(
                    model = %response.model,
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    "LLM completion succeeded"
                );
                RelayReply {
                    reply: response.content,
                    note: None,
                }
            }
            Ok(response) => {
                tracing::warn!(model = %response.model, "LLM returned an empty completion");
                RelayReply::fallback(last_text, FailureCategory::Unavailable)
            }
            Err(err) => {
                let category = FailureCategory::from(&err);
                match category {
                    FailureCategory::Unavailable => {
                        tracing::error!(error = %err, %category, "LLM call failed, serving demo reply")
                    }
                    _ => {
                        tracing::warn!(error = %err, %category, "LLM call rejected, serving demo reply")
                    }
                }
                RelayReply::fallback(last_text, category)
            }
        }
    }
}
