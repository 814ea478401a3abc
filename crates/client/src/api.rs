//! HTTP client for the Chatline API

use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::session::ChatMessage;

/// API base used when `CHATLINE_API_URL` is unset
pub const DEFAULT_API_URL: &str = "http://localhost:5050";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_url = std::env::var("CHATLINE_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self { api_url }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Body of a successful `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// A conversation as stored by the server
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConversation {
    pub id: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct MessagesBody<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Anything that can turn a history into a reply
#[async_trait::async_trait]
pub trait RelayClient: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatReply, ClientError>;
}

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Store a new conversation
    pub async fn save(&self, messages: &[ChatMessage]) -> Result<SavedConversation, ClientError> {
        let response = self
            .client
            .post(self.url("/api/conversations"))
            .json(&MessagesBody { messages })
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Replace the messages of a stored conversation
    pub async fn update(
        &self,
        id: &str,
        messages: &[ChatMessage],
    ) -> Result<SavedConversation, ClientError> {
        let response = self
            .client
            .put(self.url(&format!("/api/conversations/{}", id)))
            .json(&MessagesBody { messages })
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Most recently updated conversations first
    pub async fn list(&self) -> Result<Vec<SavedConversation>, ClientError> {
        let response = self
            .client
            .get(self.url("/api/conversations"))
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    pub async fn get(&self, id: &str) -> Result<SavedConversation, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/api/conversations/{}", id)))
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }
}

#[async_trait::async_trait]
impl RelayClient for ApiClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatReply, ClientError> {
        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(&MessagesBody { messages })
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }
}

/// Turn a non-success status into `ClientError::Http`
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let details = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or(body);

    Err(ClientError::Http {
        status: status.as_u16(),
        details,
    })
}
