use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry of the backend's `messagesHistory`. The backend has no system
/// role; `from` is "you" for user turns and "assistant" for model turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalkAiMessage {
    pub id: String,
    pub from: String,
    pub content: String,
}

impl TalkAiMessage {
    pub fn from_user(content: String) -> Self {
        Self::new("you", content)
    }

    pub fn from_assistant(content: String) -> Self {
        Self::new("assistant", content)
    }

    fn new(from: &str, content: String) -> Self {
        TalkAiMessage {
            id: Uuid::new_v4().to_string(),
            from: from.to_string(),
            content,
        }
    }
}

/// Generation settings sent alongside the history. Both fields are resolved
/// to concrete values before this struct is built; the backend never sees an
/// absent temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalkAiSettings {
    pub model: String,
    pub temperature: f64,
}

/// The backend request payload for `POST /chat/send/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalkAiRequest {
    #[serde(rename = "type")]
    pub request_type: String,

    #[serde(rename = "messagesHistory")]
    pub messages_history: Vec<TalkAiMessage>,

    pub settings: TalkAiSettings,
}

impl TalkAiRequest {
    pub fn chat(messages_history: Vec<TalkAiMessage>, settings: TalkAiSettings) -> Self {
        TalkAiRequest {
            request_type: "chat".to_string(),
            messages_history,
            settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_request_field_names() {
        let req = TalkAiRequest::chat(
            vec![TalkAiMessage::from_user("Hello".to_string())],
            TalkAiSettings {
                model: "claude-opus-4-1-20250805".to_string(),
                temperature: 0.7,
            },
        );

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "chat");
        assert_eq!(json["messagesHistory"][0]["from"], "you");
        assert!(json["messagesHistory"][0]["id"].is_string());
        assert_eq!(json["settings"]["model"], "claude-opus-4-1-20250805");
        assert_eq!(json["settings"]["temperature"], 0.7);
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = TalkAiMessage::from_user("a".to_string());
        let b = TalkAiMessage::from_user("b".to_string());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_from_values() {
        assert_eq!(TalkAiMessage::from_user(String::new()).from, "you");
        assert_eq!(TalkAiMessage::from_assistant(String::new()).from, "assistant");
    }
}
