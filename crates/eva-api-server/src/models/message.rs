use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry of a conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Epoch milliseconds, assigned by the server on append
    #[serde(default)]
    pub timestamp: i64,
}

/// Body of `POST /api/state/{id}/messages`. Any client timestamp is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AppendMessageRequest {
    pub role: Role,
    pub content: String,
}
