//! Conversation management API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use chatline_common::{Error, Pagination, Result, ValidatedJson};
use serde::Serialize;
use uuid::Uuid;

use crate::api::middleware::ConversationsState;
use crate::domain::entities::{Conversation, Message};
use crate::domain::validation::MessagesRequest;

const NOT_FOUND: &str = "Conversation not found";

/// Conversation response DTO
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: Uuid,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            messages: c.messages.0,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Acknowledgement for a deleted conversation
#[derive(Debug, Serialize)]
pub struct DeleteConversationResponse {
    pub message: String,
}

/// Ids that do not parse cannot name a stored conversation
fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| Error::NotFound(NOT_FOUND.to_string()))
}

/// List conversations, most recently updated first
pub async fn list_conversations(
    State(state): State<ConversationsState>,
    page: Pagination,
) -> Result<Json<Vec<ConversationResponse>>> {
    let convs = state
        .store
        .find_all_sorted(page.limit(), page.offset())
        .await
        .map_err(|e| e.into_internal("Failed to fetch conversations"))?;

    let responses: Vec<ConversationResponse> = convs.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// Get a single conversation by ID
pub async fn get_conversation(
    State(state): State<ConversationsState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationResponse>> {
    let id = parse_id(&id)?;

    let conv = state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| e.into_internal("Failed to fetch conversation"))?
        .ok_or_else(|| Error::NotFound(NOT_FOUND.to_string()))?;

    Ok(Json(conv.into()))
}

/// Save a new conversation
pub async fn create_conversation(
    State(state): State<ConversationsState>,
    ValidatedJson(req): ValidatedJson<MessagesRequest>,
) -> Result<(StatusCode, Json<ConversationResponse>)> {
    let conversation = Conversation::new(req.into_messages()?)?;

    let created = state
        .store
        .insert(&conversation)
        .await
        .map_err(|e| e.into_internal("Failed to save conversation"))?;

    tracing::info!(
        conversation_id = %created.id,
        message_count = created.messages().len(),
        "Conversation created"
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Replace a conversation's transcript
pub async fn update_conversation(
    State(state): State<ConversationsState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<MessagesRequest>,
) -> Result<Json<ConversationResponse>> {
    let messages = req.into_messages()?;
    let id = parse_id(&id)?;

    let updated = state
        .store
        .update_by_id(id, messages)
        .await
        .map_err(|e| e.into_internal("Failed to update conversation"))?
        .ok_or_else(|| Error::NotFound(NOT_FOUND.to_string()))?;

    tracing::info!(
        conversation_id = %updated.id,
        message_count = updated.messages().len(),
        "Conversation updated"
    );

    Ok(Json(updated.into()))
}

/// Delete a conversation
pub async fn delete_conversation(
    State(state): State<ConversationsState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConversationResponse>> {
    let id = parse_id(&id)?;

    let deleted = state
        .store
        .delete_by_id(id)
        .await
        .map_err(|e| e.into_internal("Failed to delete conversation"))?;

    if !deleted {
        return Err(Error::NotFound(NOT_FOUND.to_string()));
    }

    tracing::info!(conversation_id = %id, "Conversation deleted");

    Ok(Json(DeleteConversationResponse {
        message: "Conversation deleted successfully".to_string(),
    }))
}
