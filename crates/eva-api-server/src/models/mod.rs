pub mod chat;
pub mod message;
pub mod telemetry;

pub use chat::{ChatMessage, ChatRequest, ChatResponse};
pub use message::{AppendMessageRequest, Message, Role};
pub use telemetry::{Position, TelemetrySnapshot};
