use crate::agent::AIAgent;
use crate::history::HistoryStore;
use crate::models::api::Exchange;
use crate::models::chat::{ ChatMessage, MessageIds };

use log::{ debug, error };
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_USER_ID: &str = "anonymous";

pub const PROCESSING_ERROR_REPLY: &str =
    "I apologize, but I encountered an error processing your message. Please try again.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message is required")]
    Validation,

    /// The user turn was stored; `exchange.bot_message` carries an apology
    /// that callers should still show.
    #[error("{reason}")]
    Internal {
        reason: String,
        exchange: Exchange,
    },
}

/// Runs one chat request end to end: validate, load context, ask the agent,
/// record the turns.
pub struct ChatService {
    agent: AIAgent,
    history: Arc<HistoryStore>,
    ids: MessageIds,
}

impl ChatService {
    pub fn new(agent: AIAgent, history: Arc<HistoryStore>) -> Self {
        Self { agent, history, ids: MessageIds::new() }
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub async fn handle(&self, message: &str, user_id: Option<&str>) -> Result<Exchange, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::Validation);
        }

        let user_id = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_USER_ID);
        let user_message = ChatMessage::user(self.ids.next(), message, user_id);

        let context = self.history.filter_by_user(user_id).await;
        debug!("Loaded {} prior turns for user '{}'", context.len(), user_id);

        let reply = self.agent.reply(message, &context).await;

        if reply.is_empty() {
            let reason = "Invalid response from AI service".to_string();
            error!("Error processing message: {}", reason);
            let bot_message = ChatMessage::assistant(self.ids.next(), PROCESSING_ERROR_REPLY, user_id);
            self.history.append(user_message.clone()).await;
            return Err(ChatError::Internal {
                reason,
                exchange: Exchange { user_message, bot_message },
            });
        }

        let bot_message = ChatMessage::assistant(self.ids.next(), reply, user_id);
        // Two separate appends; another request may land in between.
        self.history.append(user_message.clone()).await;
        self.history.append(bot_message.clone()).await;

        Ok(Exchange { user_message, bot_message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::{ ChatClient, ChatRequest };
    use crate::llm::error::UpstreamError;
    use crate::llm::{ fallback, BackendConfig };
    use crate::models::chat::Sender;
    use async_trait::async_trait;

    struct FixedClient(&'static str);

    #[async_trait]
    impl ChatClient for FixedClient {
        async fn chat(&self, _request: &ChatRequest) -> Result<String, UpstreamError> {
            Ok(self.0.to_string())
        }

        fn get_base_url(&self) -> String {
            "http://fixed".into()
        }
    }

    fn offline_service() -> ChatService {
        ChatService::new(AIAgent::offline(), Arc::new(HistoryStore::new()))
    }

    fn service_replying(text: &'static str) -> ChatService {
        let agent = AIAgent::with_client(
            Some(Arc::new(FixedClient(text)) as Arc<dyn ChatClient>),
            &BackendConfig { enabled: true, ..BackendConfig::default() },
            "system".into()
        );
        ChatService::new(agent, Arc::new(HistoryStore::new()))
    }

    #[tokio::test]
    async fn rejects_blank_messages_without_storing() {
        let service = offline_service();
        for blank in ["", "   ", "\n\t"] {
            assert!(matches!(service.handle(blank, None).await, Err(ChatError::Validation)));
        }
        assert!(service.history().is_empty().await);
    }

    #[tokio::test]
    async fn stores_user_then_assistant_turn() {
        let service = offline_service();
        let exchange = service.handle("hi", None).await.unwrap();

        assert_eq!(exchange.bot_message.text, fallback::GREETING_REPLY);
        assert_eq!(exchange.user_message.user_id.as_deref(), Some(DEFAULT_USER_ID));
        assert!(exchange.bot_message.id > exchange.user_message.id);

        let all = service.history().all().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].sender, Sender::User);
        assert_eq!(all[1].sender, Sender::Assistant);
    }

    #[tokio::test]
    async fn blank_user_id_resolves_to_anonymous() {
        let service = offline_service();
        let exchange = service.handle("hello", Some("  ")).await.unwrap();
        assert_eq!(exchange.user_message.user_id.as_deref(), Some(DEFAULT_USER_ID));
    }

    #[tokio::test]
    async fn context_only_includes_same_user() {
        let service = offline_service();
        service.handle("first from alice", Some("alice")).await.unwrap();
        service.handle("first from bob", Some("bob")).await.unwrap();

        let alice = service.history().filter_by_user("alice").await;
        assert_eq!(alice.len(), 2);
        assert!(alice.iter().all(|m| m.user_id.as_deref() == Some("alice")));
    }

    #[tokio::test]
    async fn empty_reply_keeps_user_turn_and_returns_apology() {
        let service = service_replying("");
        let err = service.handle("tell me something", Some("carol")).await.unwrap_err();

        match err {
            ChatError::Internal { reason, exchange } => {
                assert_eq!(reason, "Invalid response from AI service");
                assert_eq!(exchange.bot_message.text, PROCESSING_ERROR_REPLY);
                assert_eq!(exchange.user_message.text, "tell me something");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let all = service.history().all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].sender, Sender::User);
    }

    #[tokio::test]
    async fn history_stays_bounded_across_many_exchanges() {
        let service = offline_service();
        for i in 0..60 {
            service.handle(&format!("message {}", i), None).await.unwrap();
        }
        let all = service.history().all().await;
        assert_eq!(all.len(), crate::history::MAX_HISTORY_LEN);
        assert_eq!(all[0].text, "message 10");
    }
}
