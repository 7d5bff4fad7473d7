use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use eva_api_server::config::Settings;
use eva_api_server::services::{ChatService, ConversationStore, LlmService};
use eva_api_server::{build_router, storage, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,eva_api_server=debug".to_string()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .init();

    info!("🚀 Starting EVA Assistant API Server...");

    // Load configuration
    let settings = Settings::load()?;
    match Settings::config_file() {
        Some(path) => info!("✅ Configuration loaded (file: {})", path.display()),
        None => info!("✅ Configuration loaded from defaults and environment"),
    }

    // Initialize storage
    let backend = storage::open_backend(&settings.store)?;
    let store = Arc::new(ConversationStore::new(backend, settings.store.max_messages));
    info!("✅ Conversation store ready");

    // Initialize services
    let llm_service = Arc::new(LlmService::new(settings.llm.clone())?);
    info!("✅ LLM client configured for {} ({})", settings.llm.base_url, settings.llm.model);

    let chat_service = Arc::new(ChatService::new(
        llm_service,
        settings.prompts.system_prompt.clone(),
        settings.store.history_window,
    ));

    // Build router
    let app = build_router(AppState {
        store,
        chat_service,
    });

    // Server address
    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("🎯 Server listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
