//! Conversation state management
//!
//! Provides per-conversation persistence with:
//! - Bounded message log (oldest entries evicted)
//! - Latest telemetry snapshot with nominal defaults
//! - One exclusive execution context per conversation id

mod store;

pub use store::ConversationStore;
