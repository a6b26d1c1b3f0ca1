use bytes::Bytes;
use futures::Stream;
use reqwest::Client;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

use crate::error::{ProxyError, Result};
use crate::models::talkai::TalkAiRequest;

/// The TalkAI chat endpoint. The trailing slash is load-bearing: without it
/// the backend answers with a redirect instead of a stream.
pub const CHAT_ENDPOINT: &str = "https://claude.talkai.info/chat/send/";

/// The backend rejects requests without a browser-looking user agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const ACCEPT: &str = "application/json, text/event-stream";

pub type BackendStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

#[derive(Debug, Clone)]
pub struct TalkAiClient {
    client: Client,
}

impl TalkAiClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            ProxyError::InternalError(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client })
    }

    /// Send a chat request and hand back the raw body stream. Both reply
    /// modes consume this stream; dropping it early closes the backend
    /// connection.
    pub async fn send_chat(&self, request: &TalkAiRequest) -> Result<BackendStream> {
        let body = serde_json::to_vec(request)?;
        debug!(
            model = %request.settings.model,
            turns = request.messages_history.len(),
            bytes = body.len(),
            "forwarding chat to TalkAI"
        );

        let response = self
            .client
            .post(CHAT_ENDPOINT)
            .header("User-Agent", USER_AGENT)
            .header("Accept", ACCEPT)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            debug!(%status, body = %error_body, "TalkAI rejected the request");
            return Err(ProxyError::BackendError { status });
        }

        Ok(Box::pin(response.bytes_stream()))
    }
}
