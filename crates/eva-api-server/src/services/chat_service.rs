use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::models::{ChatMessage, ChatRequest, TelemetrySnapshot};
use crate::services::alert::{self, AlertStatus};
use crate::services::llm_service::LlmProvider;
use crate::utils::error::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub alerts: AlertStatus,
}

/// Builds the model context for a chat turn and evaluates alerts on the result.
pub struct ChatService {
    llm: Arc<dyn LlmProvider>,
    system_prompt: String,
    history_window: usize,
}

impl ChatService {
    pub fn new(llm: Arc<dyn LlmProvider>, system_prompt: String, history_window: usize) -> Self {
        Self {
            llm,
            system_prompt,
            history_window,
        }
    }

    /// System prompt, trailing history window, telemetry context, then the user turn.
    pub fn build_messages(&self, request: &ChatRequest, telemetry: &TelemetrySnapshot) -> Vec<ChatMessage> {
        let history = &request.conversation_history;
        let start = history.len().saturating_sub(self.history_window);

        let mut messages = Vec::with_capacity(history.len() - start + 3);
        messages.push(ChatMessage::new("system", self.system_prompt.clone()));
        messages.extend(history[start..].iter().map(ChatMessage::from));
        messages.push(ChatMessage::new("system", telemetry.describe()));
        messages.push(ChatMessage::new("user", request.message.clone()));
        messages
    }

    pub async fn reply(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        let telemetry = match &request.telemetry {
            Some(snapshot) => {
                snapshot.validate()?;
                snapshot.clone()
            }
            None => TelemetrySnapshot::default(),
        };

        let messages = self.build_messages(request, &telemetry);
        debug!(
            "Forwarding chat with {} messages ({} history entries received)",
            messages.len(),
            request.conversation_history.len()
        );

        let response = self.llm.generate(&messages).await?;
        let alerts = alert::evaluate(&request.message, &telemetry);

        if alerts.emergency {
            info!(
                "Emergency flagged (telemetry_alert={}) for message of {} chars",
                alerts.telemetry_alert,
                request.message.len()
            );
        }

        Ok(ChatReply { response, alerts })
    }
}
