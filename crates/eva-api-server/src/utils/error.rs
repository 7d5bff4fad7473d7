use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    /// Chat pipeline failure, reported to clients as a fallback payload.
    #[error("Chat failed: {0}")]
    ChatFailed(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback: Option<bool>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::StorageError(_)
            | ApiError::InternalError(_)
            | ApiError::ChatFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::LlmError(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error_type, message, fallback) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                ("BadRequest".to_string(), msg, None)
            },
            ApiError::StorageError(msg) => {
                tracing::error!("Storage error: {}", msg);
                ("StorageError".to_string(), msg, None)
            },
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("InternalError".to_string(), msg, None)
            },
            ApiError::LlmError(msg) => {
                tracing::error!("LLM error: {}", msg);
                ("LlmError".to_string(), msg, None)
            },
            ApiError::ChatFailed(msg) => {
                tracing::error!("Chat failed: {}", msg);
                ("Failed to process message".to_string(), msg, Some(true))
            },
        };

        let body = Json(ErrorResponse {
            error: error_type,
            message,
            fallback,
        });

        (status, body).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::StorageError(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(format!("Invalid telemetry: {}", errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_bad_request_shape() {
        let response = ApiError::BadRequest("missing field `query`".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "BadRequest");
        assert_eq!(json["message"], "missing field `query`");
        assert!(json.get("fallback").is_none());
    }

    #[tokio::test]
    async fn test_chat_failed_carries_fallback_flag() {
        let response = ApiError::ChatFailed("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["fallback"], true);
        assert_eq!(json["message"], "connection refused");
        assert!(json["error"].is_string());
    }

    #[test]
    fn test_storage_error_is_server_side() {
        let codec = serde_json::from_slice::<Vec<u8>>(b"not json").unwrap_err();
        let err = ApiError::from(StorageError::from(codec));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, ApiError::StorageError(ref msg) if msg.starts_with("Codec error")));
    }
}
