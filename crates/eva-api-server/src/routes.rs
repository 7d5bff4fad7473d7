use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let state_routes = Router::new()
        .route(
            "/api/state/{conversation_id}/messages",
            get(handlers::conversation::list_messages_handler)
                .post(handlers::conversation::append_message_handler),
        )
        .route(
            "/api/state/{conversation_id}/telemetry",
            get(handlers::conversation::get_telemetry_handler)
                .post(handlers::conversation::set_telemetry_handler),
        )
        .route(
            "/api/state/{conversation_id}/reset",
            post(handlers::conversation::reset_handler),
        );

    let api_routes = Router::new()
        .route("/api/chat", post(handlers::chat::chat_handler))
        .route("/api/procedures/search", post(handlers::procedures::search_handler))
        .route("/api/health", get(handlers::health::health_check));

    Router::new()
        .merge(state_routes)
        .merge(api_routes)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(middleware::from_fn(handlers::preflight))
        // CORS
        .layer(CorsLayer::permissive())
        // Tracing
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
}
