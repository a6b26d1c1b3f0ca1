use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{ProxyError, Result};
use crate::state::AppState;

/// Check a client `Authorization` header value against the configured key
/// set. An empty set disables authentication entirely.
///
/// The header must be exactly two space-separated parts with `Bearer` first;
/// anything else (no space, extra spaces, a different scheme) is a format
/// error rather than a key mismatch.
pub fn authorize(keys: &HashSet<String>, header: Option<&str>) -> Result<()> {
    if keys.is_empty() {
        return Ok(());
    }

    let value = header.ok_or_else(|| {
        ProxyError::AuthError("Missing authorization header".to_string())
    })?;

    let parts: Vec<&str> = value.split(' ').collect();
    if parts.len() != 2 || parts[0] != "Bearer" {
        return Err(ProxyError::AuthError(
            "Invalid authorization format".to_string(),
        ));
    }

    if !keys.contains(parts[1]) {
        return Err(ProxyError::AuthError("Invalid API key".to_string()));
    }

    Ok(())
}

/// Middleware guarding the `/v1` routes. Rejections become the standard
/// `{"error": ...}` body via [`ProxyError`].
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    authorize(&state.api_keys, value)?;
    Ok(next.run(req).await)
}
