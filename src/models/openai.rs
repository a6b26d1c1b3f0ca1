use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub const OBJECT_CHAT_COMPLETION: &str = "chat.completion";
pub const OBJECT_CHAT_COMPLETION_CHUNK: &str = "chat.completion.chunk";
pub const OBJECT_LIST: &str = "list";
pub const OBJECT_MODEL: &str = "model";

/// Owner reported for every model in `/v1/models`.
pub const MODEL_OWNER: &str = "talkai";

pub const FINISH_REASON_STOP: &str = "stop";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user" or "assistant"; anything else is dropped during
    /// translation
    pub role: String,
    pub content: String,
}

/// Inbound chat-completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Falls back to the configured default model when absent or empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Required and must be non-empty
    pub messages: Vec<ChatMessage>,

    #[serde(default)]
    pub stream: bool,

    /// Falls back to the configured default temperature when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatCompletionChoice>,
    pub usage: Usage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionChoice {
    pub message: ChatMessage,
    pub index: u32,
    pub finish_reason: String,
}

/// Token accounting is not implemented; every response reports zeros.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ChatCompletionResponse {
    /// One consolidated assistant reply, the non-streaming output shape.
    pub fn completed(model: &str, content: String) -> Self {
        ChatCompletionResponse {
            id: completion_id(),
            object: OBJECT_CHAT_COMPLETION.to_string(),
            created: unix_timestamp(),
            model: model.to_string(),
            choices: vec![ChatCompletionChoice {
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content,
                },
                index: 0,
                finish_reason: FINISH_REASON_STOP.to_string(),
            }],
            usage: Usage::default(),
        }
    }
}

/// One streaming chunk (`object: "chat.completion.chunk"`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    pub delta: Delta,
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Partial-message payload. The role chunk carries only `role`, content
/// chunks only `content`, and the terminal chunk neither (`{}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl StreamChunk {
    fn base(id: &str, created: i64, model: &str, choice: StreamChoice) -> Self {
        StreamChunk {
            id: id.to_string(),
            object: OBJECT_CHAT_COMPLETION_CHUNK.to_string(),
            created,
            model: model.to_string(),
            choices: vec![choice],
        }
    }

    /// First chunk of a stream: announces the assistant role, no content.
    pub fn initial(id: &str, created: i64, model: &str) -> Self {
        Self::base(
            id,
            created,
            model,
            StreamChoice {
                delta: Delta {
                    role: Some("assistant".to_string()),
                    content: None,
                },
                index: 0,
                finish_reason: None,
            },
        )
    }

    /// Content fragment chunk.
    pub fn content(id: &str, created: i64, model: &str, text: &str) -> Self {
        Self::base(
            id,
            created,
            model,
            StreamChoice {
                delta: Delta {
                    role: None,
                    content: Some(text.to_string()),
                },
                index: 0,
                finish_reason: None,
            },
        )
    }

    /// Terminal chunk: empty delta, `finish_reason: "stop"`.
    pub fn finish(id: &str, created: i64, model: &str) -> Self {
        Self::base(
            id,
            created,
            model,
            StreamChoice {
                delta: Delta::default(),
                index: 0,
                finish_reason: Some(FINISH_REASON_STOP.to_string()),
            },
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
}

impl ModelInfo {
    pub fn new(id: &str) -> Self {
        ModelInfo {
            id: id.to_string(),
            object: OBJECT_MODEL.to_string(),
            created: unix_timestamp(),
            owned_by: MODEL_OWNER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<ModelInfo>,
}

impl ModelList {
    pub fn new(data: Vec<ModelInfo>) -> Self {
        ModelList {
            object: OBJECT_LIST.to_string(),
            data,
        }
    }
}

/// Seconds since the unix epoch, the `created` field of every response.
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Fresh `chatcmpl-<uuid>` identifier shared by all chunks of one reply.
pub fn completion_id() -> String {
    format!("chatcmpl-{}", Uuid::new_v4())
}
