//! Chatline application composition root
//!
//! Wires configuration into the conversation store and chat relay, then
//! composes the domain router with the infrastructure routes.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chatline_common::Config;
use chatline_conversations::{
    ChatRelay, ConversationStore, ConversationsState, InMemoryConversationStore,
    PgConversationStore,
};
use chatline_llm::{LlmConfig, LlmServiceFactory};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;

/// Largest accepted request body (a long transcript fits comfortably)
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// How long a request waits for a pooled database connection
const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

const DB_MAX_CONNECTIONS: u32 = 10;

/// Build the conversation store for the configured database.
///
/// Connection is lazy and failures are not fatal: the server starts anyway,
/// migrations are retried on the next store call, and `/health` reports the
/// database as disconnected until the conversations table is queryable.
pub async fn connect_store(database_url: Option<&str>) -> Arc<dyn ConversationStore> {
    let Some(url) = database_url else {
        tracing::warn!("DATABASE_URL not set, conversations are kept in memory");
        return Arc::new(InMemoryConversationStore::new());
    };

    let pool = match PgPoolOptions::new()
        .max_connections(DB_MAX_CONNECTIONS)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT)
        .connect_lazy(url)
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Invalid DATABASE_URL, conversations are kept in memory");
            return Arc::new(InMemoryConversationStore::new());
        }
    };

    let store = PgConversationStore::new(pool);
    match store.ensure_schema().await {
        Ok(()) => tracing::info!("Database connection established"),
        Err(e) => tracing::error!(error = %e, "Database unavailable, migrations retried on next use"),
    }

    Arc::new(store)
}

/// Build the chat relay; without a usable OpenAI key it runs in demo mode
pub fn build_relay(config: &Config) -> ChatRelay {
    let llm_config = LlmConfig {
        api_key: config.openai_api_key.clone(),
        base_url: config.openai_base_url.clone(),
        ..LlmConfig::default()
    };

    let relay = ChatRelay::new(LlmServiceFactory::create(llm_config));
    if !relay.is_live() {
        tracing::warn!("Chat relay running in demo mode");
    }
    relay
}

/// Build the domain state from configuration
pub async fn build_state(config: &Config) -> ConversationsState {
    let store = connect_store(config.database_url.as_deref()).await;
    ConversationsState::new(store, build_relay(config))
}

/// Create the main application router with all routes
pub fn create_app(state: ConversationsState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .merge(chatline_conversations::routes())
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Permissive CORS; the browser client is served from another origin
pub fn build_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub database: &'static str,
}

/// Health check endpoint
async fn health_check(State(state): State<ConversationsState>) -> Json<HealthResponse> {
    let database = if state.store.ping().await {
        "connected"
    } else {
        "disconnected"
    };

    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        database,
    })
}

/// Welcome document listing the API entry points
async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Chatline API!",
        "endpoints": {
            "chat": "/api/chat",
            "conversations": "/api/conversations",
            "health": "/health"
        }
    }))
}

async fn route_not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}
