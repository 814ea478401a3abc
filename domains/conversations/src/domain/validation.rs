//! Request payload shared by the chat and conversation endpoints
//!
//! Both accept `{ "messages": [...] }`. Shape validation happens here, in
//! the API layer, before anything reaches the relay or the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use chatline_common::Result;

use super::entities::{Message, Sender, MESSAGES_REQUIRED};

/// A message as submitted by a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageInput {
    pub sender: Sender,
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl TryFrom<MessageInput> for Message {
    type Error = chatline_common::Error;

    fn try_from(input: MessageInput) -> Result<Self> {
        Message::new(input.sender, input.text, input.timestamp)
    }
}

/// Body of `POST /api/chat`, `POST /api/conversations` and
/// `PUT /api/conversations/{id}`
#[derive(Debug, Deserialize, Validate)]
pub struct MessagesRequest {
    #[serde(default, deserialize_with = "array_or_none")]
    #[validate(
        required(message = "Messages array is required"),
        length(min = 1, message = "Messages array is required")
    )]
    pub messages: Option<Vec<MessageInput>>,
}

impl MessagesRequest {
    /// Convert the validated payload into domain messages
    pub fn into_messages(self) -> Result<Vec<Message>> {
        let inputs = self
            .messages
            .filter(|m| !m.is_empty())
            .ok_or_else(|| chatline_common::Error::Validation(MESSAGES_REQUIRED.to_string()))?;

        inputs.into_iter().map(Message::try_from).collect()
    }
}

/// Deserialize an array of messages; any non-array value (null, object,
/// string, number) is treated as absent so it fails the `required` rule
/// with the same message as a missing field.
fn array_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<MessageInput>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}
