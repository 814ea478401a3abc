//! Conversation storage
//!
//! The store is schema-oblivious: it persists whole conversation documents
//! keyed by id. Validation happens before a conversation reaches it.

pub mod conversations;
pub mod memory;

use async_trait::async_trait;
use chatline_common::Result;
use uuid::Uuid;

use crate::domain::entities::{Conversation, Message};

pub use conversations::PgConversationStore;
pub use memory::InMemoryConversationStore;

/// Id-keyed persistence of conversation documents
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persist a new conversation and return the stored record
    async fn insert(&self, conversation: &Conversation) -> Result<Conversation>;

    /// Find a conversation by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>>;

    /// Page through conversations, most recently updated first
    async fn find_all_sorted(&self, limit: i64, offset: i64) -> Result<Vec<Conversation>>;

    /// Replace a conversation's entire transcript.
    ///
    /// Returns `None` when no conversation has this id.
    async fn update_by_id(&self, id: Uuid, messages: Vec<Message>)
        -> Result<Option<Conversation>>;

    /// Delete a conversation; `false` when no conversation had this id
    async fn delete_by_id(&self, id: Uuid) -> Result<bool>;

    /// Whether the backing storage is reachable
    async fn ping(&self) -> bool;
}
