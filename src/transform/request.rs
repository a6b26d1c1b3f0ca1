use crate::config::ProxyConfig;
use crate::error::{ProxyError, Result};
use crate::models::openai::{ChatCompletionRequest, ChatMessage};
use crate::models::talkai::{TalkAiMessage, TalkAiRequest, TalkAiSettings};
use crate::transform::resolve_stream_mode;

/// An inbound request with every optional knob resolved: the backend payload
/// plus the model echoed in responses and the effective streaming mode.
#[derive(Debug, Clone)]
pub struct TranslatedRequest {
    pub backend: TalkAiRequest,
    pub model: String,
    pub stream: bool,
}

/// Reject requests the gateway cannot translate. The message is what the
/// client sees in the error body.
pub fn validate_request(req: &ChatCompletionRequest) -> Result<()> {
    if req.messages.is_empty() {
        return Err(ProxyError::InvalidRequest("Messages required".to_string()));
    }
    Ok(())
}

/// Translate a chat-completion request into the backend shape.
///
/// `stream_param` is the raw `stream` query parameter, if any; see
/// [`resolve_stream_mode`] for the precedence it participates in.
pub fn translate_request(
    req: &ChatCompletionRequest,
    config: &ProxyConfig,
    stream_param: Option<&str>,
) -> Result<TranslatedRequest> {
    validate_request(req)?;

    // An absent or empty model means "use the default".
    let model = req
        .model
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or(&config.default_model)
        .to_string();

    let temperature = req.temperature.unwrap_or(config.default_temperature);
    let stream = resolve_stream_mode(req.stream, stream_param, config.default_stream);

    let history = build_history(&req.messages);

    Ok(TranslatedRequest {
        backend: TalkAiRequest::chat(
            history,
            TalkAiSettings {
                model: model.clone(),
                temperature,
            },
        ),
        model,
        stream,
    })
}

/// Build the backend `messagesHistory` from the inbound messages.
///
/// The backend has no system role: the last system message's content is
/// prepended to the trailing user turn (blank-line separator) when the
/// history ends with one, and dropped otherwise. User and assistant turns
/// keep their relative order; any other role is dropped.
pub fn build_history(messages: &[ChatMessage]) -> Vec<TalkAiMessage> {
    let mut history = Vec::new();
    let mut system_prompt = String::new();

    for msg in messages {
        match msg.role.as_str() {
            "system" => system_prompt = msg.content.clone(),
            "user" => history.push(TalkAiMessage::from_user(msg.content.clone())),
            "assistant" => history.push(TalkAiMessage::from_assistant(msg.content.clone())),
            other => {
                tracing::debug!(role = %other, "dropping message with unsupported role");
            }
        }
    }

    if !system_prompt.is_empty() {
        if let Some(last) = history.last_mut() {
            if last.from == "you" {
                last.content = format!("{}\n\n{}", system_prompt, last.content);
            }
        }
    }

    history
}
