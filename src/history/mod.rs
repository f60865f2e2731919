use std::collections::VecDeque;
use tokio::sync::RwLock;
use crate::models::chat::ChatMessage;

pub const MAX_HISTORY_LEN: usize = 100;

/// Process-wide transcript shared by every request.
///
/// Each call is atomic on its own, nothing more. Two appends made for one
/// exchange can interleave with other requests or with `clear`, so a reader
/// may see a user turn whose reply has not landed yet (or never will).
#[derive(Debug)]
pub struct HistoryStore {
    messages: RwLock<VecDeque<ChatMessage>>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY_LEN)
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: RwLock::new(VecDeque::with_capacity(capacity + 1)),
            capacity,
        }
    }

    /// Appends to the tail, then evicts from the head until the buffer fits.
    pub async fn append(&self, message: ChatMessage) {
        let mut messages = self.messages.write().await;
        messages.push_back(message);
        while messages.len() > self.capacity {
            messages.pop_front();
        }
    }

    pub async fn filter_by_user(&self, user_id: &str) -> Vec<ChatMessage> {
        self.messages
            .read().await
            .iter()
            .filter(|msg| msg.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect()
    }

    pub async fn all(&self) -> Vec<ChatMessage> {
        self.messages.read().await.iter().cloned().collect()
    }

    pub async fn clear(&self) {
        self.messages.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_msg(id: i64, user: &str) -> ChatMessage {
        ChatMessage::user(id, format!("message {}", id), user)
    }

    #[tokio::test]
    async fn keeps_insertion_order() {
        let store = HistoryStore::new();
        for id in 1..=3 {
            store.append(user_msg(id, "anonymous")).await;
        }
        let ids: Vec<i64> = store.all().await.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn evicts_oldest_beyond_capacity() {
        let store = HistoryStore::new();
        for id in 1..=(MAX_HISTORY_LEN as i64 + 1) {
            store.append(user_msg(id, "anonymous")).await;
        }
        let all = store.all().await;
        assert_eq!(all.len(), MAX_HISTORY_LEN);
        assert_eq!(all.first().map(|m| m.id), Some(2));
        assert_eq!(all.last().map(|m| m.id), Some(MAX_HISTORY_LEN as i64 + 1));
    }

    #[tokio::test]
    async fn bound_holds_for_small_capacity() {
        let store = HistoryStore::with_capacity(3);
        for id in 1..=10 {
            store.append(user_msg(id, "anonymous")).await;
            assert!(store.len().await <= 3);
        }
        let ids: Vec<i64> = store.all().await.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![8, 9, 10]);
    }

    #[tokio::test]
    async fn filters_by_user_preserving_order() {
        let store = HistoryStore::new();
        store.append(user_msg(1, "alice")).await;
        store.append(user_msg(2, "bob")).await;
        store.append(ChatMessage::assistant(3, "reply", "alice")).await;
        store.append(user_msg(4, "alice")).await;

        let ids: Vec<i64> = store.filter_by_user("alice").await.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert!(store.filter_by_user("carol").await.is_empty());
    }

    #[tokio::test]
    async fn clear_empties_the_buffer() {
        let store = HistoryStore::new();
        store.append(user_msg(1, "anonymous")).await;
        store.clear().await;
        assert!(store.is_empty().await);
        assert!(store.all().await.is_empty());
    }
}
