//! In-memory conversation store
//!
//! Used when no database is configured and by the test suites. Each
//! operation takes the lock once, so updates to a single conversation are
//! atomic and concurrent writers are last-write-wins.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chatline_common::Result;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ConversationStore;
use crate::domain::entities::{Conversation, Message};

#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    conversations: Arc<RwLock<HashMap<Uuid, Conversation>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored conversations
    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn insert(&self, conv: &Conversation) -> Result<Conversation> {
        self.conversations
            .write()
            .await
            .insert(conv.id, conv.clone());
        Ok(conv.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>> {
        Ok(self.conversations.read().await.get(&id).cloned())
    }

    async fn find_all_sorted(&self, limit: i64, offset: i64) -> Result<Vec<Conversation>> {
        let mut convs: Vec<Conversation> =
            self.conversations.read().await.values().cloned().collect();

        convs.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);

        Ok(convs.into_iter().skip(offset).take(limit).collect())
    }

    async fn update_by_id(&self, id: Uuid, messages: Vec<Message>) -> Result<Option<Conversation>> {
        let mut conversations = self.conversations.write().await;

        let Some(conv) = conversations.get_mut(&id) else {
            return Ok(None);
        };

        conv.replace_messages(messages)?;
        Ok(Some(conv.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        Ok(self.conversations.write().await.remove(&id).is_some())
    }

    #[mutants::skip] // Nothing to reach; always available
    async fn ping(&self) -> bool {
        true
    }
}
