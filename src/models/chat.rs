use chrono::{ SecondsFormat, Utc };
use serde::{ Serialize, Deserialize };
use std::sync::atomic::{ AtomicI64, Ordering };

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(alias = "bot")]
    Assistant,
}

/// One turn of a conversation. Never mutated after construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ChatMessage {
    pub fn user(id: i64, text: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::User,
            timestamp: now_iso8601(),
            user_id: Some(user_id.into()),
        }
    }

    /// Assistant turns carry the user id too, so `GET /api/chat/history` shows
    /// `userId` on both halves of an exchange.
    pub fn assistant(id: i64, text: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::Assistant,
            timestamp: now_iso8601(),
            user_id: Some(user_id.into()),
        }
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}

pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Millisecond timestamps, bumped when needed so ids never repeat or go backwards.
#[derive(Debug, Default)]
pub struct MessageIds {
    last: AtomicI64,
}

impl MessageIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self.last.compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed) {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_strictly_increase() {
        let ids = MessageIds::new();
        let mut prev = ids.next();
        for _ in 0..1000 {
            let next = ids.next();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn serializes_camel_case_with_lowercase_sender() {
        let msg = ChatMessage::user(7, "hi", "alice");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["sender"], "user");
        assert_eq!(json["userId"], "alice");
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn accepts_bot_as_assistant_sender() {
        let msg: ChatMessage = serde_json::from_str(
            r#"{"id":1,"text":"yo","sender":"bot","timestamp":"2024-01-01T00:00:00.000Z"}"#
        ).unwrap();
        assert_eq!(msg.sender, Sender::Assistant);
        assert!(msg.user_id.is_none());
    }
}
