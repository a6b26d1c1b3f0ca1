use crate::models::openai::{StreamChunk, completion_id, unix_timestamp};

/// Formats the client-facing chunk stream as SSE frames.
///
/// One generator lives for one reply: the stream id and creation timestamp
/// are fixed at construction and shared by every chunk it emits.
pub struct SseEventGenerator {
    id: String,
    created: i64,
    model: String,
}

impl SseEventGenerator {
    pub fn new(model: &str) -> Self {
        Self {
            id: completion_id(),
            created: unix_timestamp(),
            model: model.to_string(),
        }
    }

    /// The first frame of every stream: assistant role, no content.
    pub fn role_event(&self) -> String {
        frame(&StreamChunk::initial(&self.id, self.created, &self.model))
    }

    /// One content fragment, exactly as the backend delivered it.
    pub fn content_event(&self, text: &str) -> String {
        frame(&StreamChunk::content(&self.id, self.created, &self.model, text))
    }

    /// The terminal chunk, empty delta with `finish_reason: "stop"`.
    pub fn finish_event(&self) -> String {
        frame(&StreamChunk::finish(&self.id, self.created, &self.model))
    }

    /// The literal stream terminator.
    pub fn done_event() -> String {
        "data: [DONE]\n\n".to_string()
    }

    pub fn stream_id(&self) -> &str {
        &self.id
    }
}

fn frame(chunk: &StreamChunk) -> String {
    match serde_json::to_string(chunk) {
        Ok(json) => format!("data: {}\n\n", json),
        Err(e) => {
            // Unreachable for this shape (strings and integers only); drop
            // the frame rather than corrupt the stream.
            tracing::error!(error = %e, "failed to encode stream chunk");
            String::new()
        }
    }
}
