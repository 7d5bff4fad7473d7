use serde::{Deserialize, Serialize};

use super::message::Message;
use super::telemetry::TelemetrySnapshot;

/// Role-tagged message in the inference wire format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self::new(message.role.as_str(), message.content.clone())
    }
}

// ===== REQUEST MODELS =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<Message>,
    /// Falls back to the nominal snapshot when absent
    #[serde(default)]
    pub telemetry: Option<TelemetrySnapshot>,
}

// ===== RESPONSE MODELS =====

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub emergency: bool,
    pub telemetry_alert: bool,
    pub timestamp: String,
}
