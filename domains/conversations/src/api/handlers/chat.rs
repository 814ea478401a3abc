//! Chat relay API handler

use axum::{extract::State, Json};
use chatline_common::{Result, ValidatedJson};

use crate::api::middleware::ConversationsState;
use crate::domain::relay::RelayReply;
use crate::domain::validation::MessagesRequest;

/// Relay a message history and return a single reply.
///
/// Only malformed input fails; completion errors come back as a canned
/// reply with a note.
pub async fn chat(
    State(state): State<ConversationsState>,
    ValidatedJson(req): ValidatedJson<MessagesRequest>,
) -> Result<Json<RelayReply>> {
    let messages = req.into_messages()?;

    tracing::debug!(
        message_count = messages.len(),
        live = state.relay.is_live(),
        "Relaying chat history"
    );

    let reply = state.relay.relay(&messages).await;
    Ok(Json(reply))
}
