//! Common test utilities and fixtures for integration tests
//!
//! - `TestApp`: the full application router over an in-memory store
//! - `FailingStore`: a store whose every operation errors, for 500 paths
//! - request and body helpers

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, Response, StatusCode},
    Router,
};
use chatline_app::create_app;
use chatline_common::{Error, Result};
use chatline_conversations::{
    ChatRelay, Conversation, ConversationStore, ConversationsState, InMemoryConversationStore,
    Message,
};
use chatline_llm::LlmService;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

/// Test application over an in-memory store
#[allow(dead_code)]
pub struct TestApp {
    pub store: Arc<InMemoryConversationStore>,
    pub relay: ChatRelay,
}

#[allow(dead_code)]
impl TestApp {
    /// Application in demo mode
    pub fn new() -> Self {
        Self::with_relay(ChatRelay::demo())
    }

    /// Application whose relay calls the given LLM service
    pub fn with_llm(llm: Arc<dyn LlmService>) -> Self {
        Self::with_relay(ChatRelay::new(Some(llm)))
    }

    fn with_relay(relay: ChatRelay) -> Self {
        Self {
            store: Arc::new(InMemoryConversationStore::new()),
            relay,
        }
    }

    /// Fresh router sharing this app's store
    pub fn router(&self) -> Router {
        let state = ConversationsState::new(self.store.clone(), self.relay.clone());
        create_app(state)
    }

    /// Send one request and return status plus JSON body
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request(method, uri, body)).await.unwrap();
        into_parts(response).await
    }

    /// Create a conversation through the API and return its id
    pub async fn create_conversation(&self, texts: &[&str]) -> String {
        let messages: Vec<Value> = texts
            .iter()
            .map(|t| serde_json::json!({"sender": "user", "text": t}))
            .collect();

        let (status, body) = self
            .send(
                Method::POST,
                "/api/conversations",
                Some(serde_json::json!({ "messages": messages })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }
}

/// Router whose store fails every call
#[allow(dead_code)]
pub fn failing_router() -> Router {
    create_app(ConversationsState::new(
        Arc::new(FailingStore),
        ChatRelay::demo(),
    ))
}

/// Build a JSON request
pub fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);

    match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Build a request with a raw body, for malformed-input cases
#[allow(dead_code)]
pub fn raw_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Split a response into status and parsed JSON body (`Null` when empty)
pub async fn into_parts(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// Store that reports every operation as a database failure
pub struct FailingStore;

fn db_down() -> Error {
    Error::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl ConversationStore for FailingStore {
    async fn insert(&self, _conversation: &Conversation) -> Result<Conversation> {
        Err(db_down())
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Conversation>> {
        Err(db_down())
    }

    async fn find_all_sorted(&self, _limit: i64, _offset: i64) -> Result<Vec<Conversation>> {
        Err(db_down())
    }

    async fn update_by_id(&self, _id: Uuid, _messages: Vec<Message>) -> Result<Option<Conversation>> {
        Err(db_down())
    }

    async fn delete_by_id(&self, _id: Uuid) -> Result<bool> {
        Err(db_down())
    }

    async fn ping(&self) -> bool {
        false
    }
}
