pub mod alert;
pub mod chat_service;
pub mod conversation;
pub mod llm_service;
pub mod procedures;

pub use chat_service::{ChatReply, ChatService};
pub use conversation::ConversationStore;
pub use llm_service::{LlmProvider, LlmService};
