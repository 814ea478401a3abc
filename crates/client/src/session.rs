//! Chat session state machine
//!
//! Two pieces of state: the transcript and whether a relay call is in
//! flight. A submit appends the user's message, sends the full history,
//! then appends the reply (and its note, if any) or a translated error.
//! The front-end renders through `take_unseen`, which always advances to
//! the newest message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ChatReply, RelayClient};
use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    in_flight: bool,
    seen: usize,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a stored transcript; everything in it counts as unseen
    pub fn with_messages(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Whether the send control is enabled for this input
    pub fn can_send(&self, input: &str) -> bool {
        !self.in_flight && !input.trim().is_empty()
    }

    /// Record the user's message and enter the in-flight state.
    ///
    /// Returns the history to send, or `None` when sending is disabled.
    pub fn begin(&mut self, input: &str) -> Option<Vec<ChatMessage>> {
        if !self.can_send(input) {
            return None;
        }

        self.messages.push(ChatMessage::new(Sender::User, input));
        self.in_flight = true;
        Some(self.messages.clone())
    }

    /// Apply the relay outcome and leave the in-flight state
    pub fn complete(&mut self, outcome: Result<ChatReply, ClientError>) {
        match outcome {
            Ok(reply) => {
                self.messages.push(ChatMessage::new(Sender::Ai, reply.reply));
                if let Some(note) = reply.note {
                    self.messages.push(ChatMessage::new(Sender::System, note));
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Chat request failed");
                self.messages
                    .push(ChatMessage::new(Sender::Ai, err.user_message()));
            }
        }
        self.in_flight = false;
    }

    /// Full submit cycle against a relay client.
    ///
    /// Returns `false` when the input was rejected without sending.
    pub async fn submit<C>(&mut self, client: &C, input: &str) -> bool
    where
        C: RelayClient + ?Sized,
    {
        let Some(history) = self.begin(input) else {
            return false;
        };

        let outcome = client.chat(&history).await;
        self.complete(outcome);
        true
    }

    /// Messages appended since the last call, oldest first
    pub fn take_unseen(&mut self) -> &[ChatMessage] {
        let start = self.seen.min(self.messages.len());
        self.seen = self.messages.len();
        &self.messages[start..]
    }

    /// Forget the transcript
    pub fn clear(&mut self) {
        self.messages.clear();
        self.seen = 0;
    }
}
