use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::models::{AppendMessageRequest, Message, TelemetrySnapshot};
use crate::services::ConversationStore;
use crate::utils::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
}

pub async fn list_messages_handler(
    State(store): State<Arc<ConversationStore>>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    Ok(Json(store.list_messages(&conversation_id).await?))
}

pub async fn append_message_handler(
    State(store): State<Arc<ConversationStore>>,
    Path(conversation_id): Path<String>,
    payload: Result<Json<AppendMessageRequest>, JsonRejection>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let Json(request) = payload?;
    let messages = store
        .append_message(&conversation_id, request.role, request.content)
        .await?;
    Ok(Json(messages))
}

pub async fn get_telemetry_handler(
    State(store): State<Arc<ConversationStore>>,
    Path(conversation_id): Path<String>,
) -> Result<Json<TelemetrySnapshot>, ApiError> {
    Ok(Json(store.get_telemetry(&conversation_id).await?))
}

pub async fn set_telemetry_handler(
    State(store): State<Arc<ConversationStore>>,
    Path(conversation_id): Path<String>,
    payload: Result<Json<TelemetrySnapshot>, JsonRejection>,
) -> Result<Json<TelemetrySnapshot>, ApiError> {
    let Json(snapshot) = payload?;
    Ok(Json(store.set_telemetry(&conversation_id, snapshot).await?))
}

pub async fn reset_handler(
    State(store): State<Arc<ConversationStore>>,
    Path(conversation_id): Path<String>,
) -> Result<Json<ResetResponse>, ApiError> {
    store.reset(&conversation_id).await?;
    info!("Reset requested for conversation {}", conversation_id);
    Ok(Json(ResetResponse { success: true }))
}
