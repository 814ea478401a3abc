//! Conversations domain state

use std::sync::Arc;

use crate::domain::relay::ChatRelay;
use crate::repository::ConversationStore;

/// Application state for the Conversations domain
#[derive(Clone)]
pub struct ConversationsState {
    pub store: Arc<dyn ConversationStore>,
    pub relay: ChatRelay,
}

impl ConversationsState {
    pub fn new(store: Arc<dyn ConversationStore>, relay: ChatRelay) -> Self {
        Self { store, relay }
    }
}
