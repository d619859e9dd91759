use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use incognito_llm::LlmError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Chat request failed: {0}")]
    Chat(#[from] LlmError),

    #[error("Attestation request failed: {0}")]
    Attestation(#[source] LlmError),

    #[error("Internal server error")]
    Internal,
}

/// Upstream error statuses pass through; anything else becomes `fallback`
fn forwarded_status(error: &LlmError, fallback: StatusCode) -> StatusCode {
    error
        .upstream_status()
        .and_then(|status| StatusCode::from_u16(status).ok())
        .filter(|status| status.is_client_error() || status.is_server_error())
        .unwrap_or(fallback)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(_) => {
                tracing::warn!("Rejected request: {}", self);
                (StatusCode::BAD_REQUEST, "Failed to process chat request")
            }
            ApiError::Chat(e) => {
                tracing::error!("Chat error: {}", e);
                let fallback = match e {
                    LlmError::Upstream { .. } => StatusCode::BAD_GATEWAY,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (forwarded_status(e, fallback), "Failed to process chat request")
            }
            ApiError::Attestation(e) => {
                tracing::error!("Error fetching attestation: {}", e);
                match e {
                    LlmError::Upstream { .. } => (
                        forwarded_status(e, StatusCode::BAD_GATEWAY),
                        "Failed to fetch attestation",
                    ),
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
                }
            }
            ApiError::Internal => {
                tracing::error!("Internal error: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
