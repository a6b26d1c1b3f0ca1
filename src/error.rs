use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    /// Malformed body or empty message list. The message is client-visible.
    #[error("{0}")]
    InvalidRequest(String),

    /// Missing, malformed, or unknown credential. The message is client-visible.
    #[error("{0}")]
    AuthError(String),

    /// The backend answered with a non-2xx status. The status is forwarded;
    /// the upstream body is never exposed to the client.
    #[error("TalkAI API error (status {status})")]
    BackendError { status: StatusCode },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::AuthError(_) => StatusCode::UNAUTHORIZED,
            ProxyError::BackendError { status } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message placed in the `{"error": ...}` response body. Validation
    /// and auth messages pass through; everything else collapses to a generic
    /// string so internal detail never leaks.
    pub fn client_message(&self) -> &str {
        match self {
            ProxyError::InvalidRequest(msg) | ProxyError::AuthError(msg) => msg,
            ProxyError::BackendError { .. } => "TalkAI API error",
            _ => "Internal error",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::warn!(%status, error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}
