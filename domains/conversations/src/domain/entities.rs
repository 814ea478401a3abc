//! Domain entities for the Conversations domain
//!
//! A conversation is a single document: an ordered transcript of messages
//! plus creation and update timestamps. Messages have no identity of their
//! own and are only ever replaced wholesale together with their parent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use chatline_common::{Error, Result};

/// Error text for a missing, malformed, or empty message list
pub const MESSAGES_REQUIRED: &str = "Messages array is required";

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
    System,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Ai => write!(f, "ai"),
            Sender::System => write!(f, "system"),
        }
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message, stamping it with the current time unless a
    /// timestamp is supplied
    pub fn new(sender: Sender, text: String, timestamp: Option<DateTime<Utc>>) -> Result<Self> {
        Self::validate_text(&text)?;

        Ok(Message {
            sender,
            text,
            timestamp: timestamp.unwrap_or_else(Utc::now),
        })
    }

    /// Shorthand for a user message stamped now
    pub fn user(text: impl Into<String>) -> Result<Self> {
        Self::new(Sender::User, text.into(), None)
    }

    /// Shorthand for an AI message stamped now
    pub fn ai(text: impl Into<String>) -> Result<Self> {
        Self::new(Sender::Ai, text.into(), None)
    }

    /// Message text must contain something other than whitespace
    fn validate_text(text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(Error::Validation("Message text is required".to_string()));
        }
        Ok(())
    }
}

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub messages: Json<Vec<Message>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new conversation from its initial transcript
    pub fn new(messages: Vec<Message>) -> Result<Self> {
        Self::validate_messages(&messages)?;

        let now = Utc::now();
        Ok(Conversation {
            id: Uuid::new_v4(),
            messages: Json(messages),
            created_at: now,
            updated_at: now,
        })
    }

    /// The ordered transcript
    pub fn messages(&self) -> &[Message] {
        &self.messages.0
    }

    /// Replace the entire transcript and refresh `updated_at`
    pub fn replace_messages(&mut self, messages: Vec<Message>) -> Result<()> {
        Self::validate_messages(&messages)?;

        self.messages = Json(messages);
        self.touch_updated_at();
        Ok(())
    }

    /// Move `updated_at` to now, never backwards
    pub fn touch_updated_at(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }

    fn validate_messages(messages: &[Message]) -> Result<()> {
        if messages.is_empty() {
            return Err(Error::Validation(MESSAGES_REQUIRED.to_string()));
        }
        Ok(())
    }
}
