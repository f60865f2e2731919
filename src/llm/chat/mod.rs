pub mod ollama;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use super::error::UpstreamError;
use super::SamplingOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

/// Body of a non-streaming `/api/chat` call.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<PromptMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<SamplingOptions>,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Performs one chat-completion call and returns the trimmed reply text.
    async fn chat(&self, request: &ChatRequest) -> Result<String, UpstreamError>;

    fn get_base_url(&self) -> String;
}

type ReplyExtractor = fn(&Value) -> Option<&Value>;

// Backends disagree on where the reply lives; tried in this order.
const REPLY_EXTRACTORS: [ReplyExtractor; 3] = [message_content, response_field, content_field];

fn message_content(body: &Value) -> Option<&Value> {
    body.get("message")?.get("content")
}

fn response_field(body: &Value) -> Option<&Value> {
    body.get("response")
}

fn content_field(body: &Value) -> Option<&Value> {
    body.get("content")
}

/// `null`, `false`, `0` and `""` count as absent.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Returns the first set candidate, trimmed. A candidate made only of
/// whitespace still wins and comes back as an empty string. A set candidate
/// that is not a string yields `None`; later candidates are not consulted.
pub fn extract_reply(body: &Value) -> Option<String> {
    REPLY_EXTRACTORS.iter()
        .filter_map(|extract| extract(body))
        .find(|value| is_set(value))?
        .as_str()
        .map(|text| text.trim().to_string())
}
