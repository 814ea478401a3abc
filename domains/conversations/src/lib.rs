//! Conversations domain: stored chat transcripts and the chat relay

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Conversation, Message, Sender};
pub use domain::relay::{ChatRelay, FailureCategory, RelayReply};

// Re-export repository types
pub use repository::{ConversationStore, InMemoryConversationStore, PgConversationStore};

// Re-export API types
pub use api::routes;
pub use api::ConversationsState;
