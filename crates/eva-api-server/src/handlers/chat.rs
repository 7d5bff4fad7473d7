use crate::models::{ChatRequest, ChatResponse};
use crate::services::ChatService;
use crate::utils::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub async fn chat_handler(
    State(chat_service): State<Arc<ChatService>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let start_time = Instant::now();
    let Json(request) = payload?;

    info!(
        "Chat request: message_len={}, history_len={}, has_telemetry={}",
        request.message.len(),
        request.conversation_history.len(),
        request.telemetry.is_some()
    );

    let reply = chat_service.reply(&request).await.map_err(|e| match e {
        ApiError::BadRequest(msg) => ApiError::BadRequest(msg),
        other => ApiError::ChatFailed(other.to_string()),
    })?;

    info!("Chat completed in {}ms", start_time.elapsed().as_millis());

    Ok(Json(ChatResponse {
        response: reply.response,
        emergency: reply.alerts.emergency,
        telemetry_alert: reply.alerts.telemetry_alert,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
