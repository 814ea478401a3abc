//! Chatline client
//!
//! Client-side chat logic, independent of how it is rendered:
//! - `ChatSession`: the message list + in-flight state machine
//! - `ApiClient`: HTTP access to the chat relay and conversation endpoints
//! - `ClientError`: failures and their user-facing translations

pub mod api;
pub mod error;
pub mod session;

pub use api::{ApiClient, ChatReply, ClientConfig, RelayClient, SavedConversation};
pub use error::ClientError;
pub use session::{ChatMessage, ChatSession, Sender};
