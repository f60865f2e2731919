use crate::config::prompt::{ DEFAULT_SYSTEM_PROMPT, PROBE_PROMPT };
use crate::llm::chat::{ ChatClient, ChatRequest, PromptMessage, Role };
use crate::llm::chat::ollama::OllamaClient;
use crate::llm::error::UpstreamError;
use crate::llm::{ fallback, BackendConfig, SamplingOptions };
use crate::models::chat::ChatMessage;

use log::{ info, warn, error };
use std::sync::Arc;

/// Most recent history entries forwarded as context.
pub const HISTORY_FOR_PROMPT_LEN: usize = 20;

pub const AUTH_ERROR_REPLY: &str =
    "I apologize, but there was an authentication error. Please check the API configuration.";
pub const MODEL_ERROR_REPLY: &str =
    "I apologize, but the AI model is not available. Please check the model configuration.";

/// Turns a user message plus prior turns into reply text.
///
/// `reply` never fails: without a backend, or when the backend misbehaves, it
/// answers from the canned fallback rules (or a fixed apology for 401/404).
#[derive(Clone)]
pub struct AIAgent {
    chat_client: Option<Arc<dyn ChatClient>>,
    model: String,
    sampling: SamplingOptions,
    system_prompt: String,
}

impl AIAgent {
    pub fn new(config: &BackendConfig, system_prompt: String) -> Result<Self, UpstreamError> {
        let chat_client: Option<Arc<dyn ChatClient>> = if config.enabled {
            Some(Arc::new(OllamaClient::from_config(config)?) as Arc<dyn ChatClient>)
        } else {
            None
        };
        Ok(Self::with_client(chat_client, config, system_prompt))
    }

    pub fn with_client(
        chat_client: Option<Arc<dyn ChatClient>>,
        config: &BackendConfig,
        system_prompt: String
    ) -> Self {
        Self {
            chat_client,
            model: config.model.clone(),
            sampling: config.sampling,
            system_prompt,
        }
    }

    /// Agent with no backend: every reply comes from the fallback rules.
    pub fn offline() -> Self {
        Self::with_client(None, &BackendConfig::default(), DEFAULT_SYSTEM_PROMPT.to_string())
    }

    /// System prompt, then the last `HISTORY_FOR_PROMPT_LEN` turns, then the new message.
    pub fn build_request(&self, user_text: &str, history: &[ChatMessage]) -> ChatRequest {
        let skip = history.len().saturating_sub(HISTORY_FOR_PROMPT_LEN);
        let mut messages = Vec::with_capacity(HISTORY_FOR_PROMPT_LEN + 2);
        messages.push(PromptMessage::new(Role::System, self.system_prompt.as_str()));
        messages.extend(
            history[skip..].iter().map(|msg| {
                let role = if msg.is_from_user() { Role::User } else { Role::Assistant };
                PromptMessage::new(role, msg.text.as_str())
            })
        );
        messages.push(PromptMessage::new(Role::User, user_text));

        ChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
            options: Some(self.sampling),
        }
    }

    pub async fn reply(&self, user_text: &str, history: &[ChatMessage]) -> String {
        let Some(client) = &self.chat_client else {
            return fallback::respond(user_text);
        };

        let request = self.build_request(user_text, history);
        match client.chat(&request).await {
            Ok(text) => text,
            Err(e) => Self::degraded_reply(&e, user_text),
        }
    }

    fn degraded_reply(err: &UpstreamError, user_text: &str) -> String {
        match err {
            UpstreamError::Status { status: 401, .. } => {
                error!("Authentication failed. Check your API key. ({})", err);
                AUTH_ERROR_REPLY.to_string()
            }
            UpstreamError::Status { status: 404, .. } => {
                error!("Model not found. Check if the model name is correct. ({})", err);
                MODEL_ERROR_REPLY.to_string()
            }
            UpstreamError::ConnectionRefused(_) => {
                warn!("{}. Is the backend running? Using fallback responses.", err);
                fallback::respond(user_text)
            }
            UpstreamError::Timeout(_) => {
                error!("{}. No response received. Using fallback responses.", err);
                fallback::respond(user_text)
            }
            UpstreamError::Protocol(_) | UpstreamError::Status { .. } | UpstreamError::Transport(_) => {
                error!("Inference backend call failed: {}. Using fallback responses.", err);
                fallback::respond(user_text)
            }
        }
    }
}

/// Sends one bare request to the backend and returns its reply, regardless of
/// whether the backend is enabled for chat traffic.
pub async fn probe_backend(config: &BackendConfig) -> Result<String, UpstreamError> {
    let client = OllamaClient::from_config(config)?;
    info!("Probing inference backend at {} with model {}", client.get_base_url(), config.model);
    let request = ChatRequest {
        model: config.model.clone(),
        messages: vec![PromptMessage::new(Role::User, PROBE_PROMPT)],
        stream: false,
        options: None,
    };
    client.chat(&request).await
}
