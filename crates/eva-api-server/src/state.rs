use std::sync::Arc;
use axum::extract::FromRef;

use crate::services::{ChatService, ConversationStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConversationStore>,
    pub chat_service: Arc<ChatService>,
}

impl FromRef<AppState> for Arc<ConversationStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<ChatService> {
    fn from_ref(state: &AppState) -> Self {
        state.chat_service.clone()
    }
}
