pub mod chat;
pub mod conversation;
pub mod health;
pub mod procedures;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Fallback for unknown routes
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Answer any OPTIONS request with an empty body. Real CORS preflights are
/// already handled by the CORS layer before reaching this point.
pub async fn preflight(request: Request<Body>, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }
    next.run(request).await
}
