use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque chat identifier.
///
/// The backend issues numeric ids today, but the client never does arithmetic
/// on them, so both numbers and strings are accepted on the wire and kept as
/// strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(String);

impl ChatId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ChatId {
    fn from(value: String) -> Self {
        ChatId(value)
    }
}

impl From<&str> for ChatId {
    fn from(value: &str) -> Self {
        ChatId(value.to_string())
    }
}

impl Serialize for ChatId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ChatId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChatIdVisitor;

        impl Visitor<'_> for ChatIdVisitor {
            type Value = ChatId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer chat id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ChatId, E> {
                Ok(ChatId(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ChatId, E> {
                Ok(ChatId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ChatId, E> {
                Ok(ChatId(v.to_string()))
            }
        }

        deserializer.deserialize_any(ChatIdVisitor)
    }
}

/// One entry in the sidebar chat list. The server sends more fields
/// (`created_at`, `message_count`, …); only these two are consumed.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ChatSummary {
    pub id: ChatId,
    pub title: String,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A single message in a chat. `created_at` is absent on optimistically
/// rendered messages and filled in by the server on the next fetch.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Client-only marker for inline failure bubbles; never serialized.
    #[serde(skip)]
    pub is_error: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Message {
            sender: Sender::User,
            text: text.into(),
            created_at: None,
            is_error: false,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Message {
            sender: Sender::Bot,
            text: text.into(),
            created_at: None,
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Message {
            sender: Sender::Bot,
            text: text.into(),
            created_at: None,
            is_error: true,
        }
    }
}

// ── Request/response bodies ──────────────────────────────────────────────────

/// `GET /api/chats`
#[derive(Clone, Debug, Deserialize)]
pub struct ChatListResponse {
    #[serde(default)]
    pub chats: Vec<ChatSummary>,
}

/// `POST /api/chats`
#[derive(Clone, Debug, Serialize)]
pub struct CreateChatRequest<'a> {
    pub title: &'a str,
}

/// `GET /api/chats/{id}/messages`
#[derive(Clone, Debug, Deserialize)]
pub struct MessageListResponse {
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// `POST /api/chats/{id}/messages`
#[derive(Clone, Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub text: &'a str,
    pub sender: Sender,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BotMessage {
    pub text: String,
}

/// Response to a sent message. `bot_message` is present on success,
/// `message` carries the failure reason otherwise.
#[derive(Clone, Debug, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub bot_message: Option<BotMessage>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /api/logout`
#[derive(Clone, Debug, Deserialize)]
pub struct LogoutResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub redirect: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/signup`
#[derive(Clone, Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /api/login`
#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Shared by sign-up and sign-in; only sign-in replies with `redirect_url`.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_id_accepts_numbers_and_strings() {
        let numeric: ChatSummary =
            serde_json::from_str(r#"{"id": 7, "title": "Quarterly report"}"#).unwrap();
        assert_eq!(numeric.id, ChatId::from("7"));

        let textual: ChatSummary =
            serde_json::from_str(r#"{"id": "abc-123", "title": "Notes"}"#).unwrap();
        assert_eq!(textual.id, ChatId::from("abc-123"));
    }

    #[test]
    fn chat_summary_ignores_extra_server_fields() {
        let body = r#"{
            "id": 3,
            "title": "New Chat",
            "created_at": "2025-05-01T10:00:00",
            "updated_at": "2025-05-01T10:05:00",
            "pdf_id": 9,
            "file_name": "report.pdf",
            "message_count": 4
        }"#;
        let chat: ChatSummary = serde_json::from_str(body).unwrap();
        assert_eq!(chat.title, "New Chat");
    }

    #[test]
    fn message_list_parses_minimal_shape() {
        let body = r#"{"success": true, "messages": [{"sender": "user", "text": "hi"}, {"sender": "bot", "text": "hello"}]}"#;
        let parsed: MessageListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.messages.len(), 2);
        assert_eq!(parsed.messages[0].sender, Sender::User);
        assert_eq!(parsed.messages[1].sender, Sender::Bot);
        assert!(!parsed.messages[0].is_error);
    }

    #[test]
    fn send_response_success_shape() {
        let body = r#"{"success": true, "user_message": {"id": 1}, "bot_message": {"id": 2, "text": "hi there"}}"#;
        let parsed: SendMessageResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.bot_message.unwrap().text, "hi there");
    }

    #[test]
    fn send_response_failure_shape() {
        let body = r#"{"success": false, "message": "Message cannot be empty"}"#;
        let parsed: SendMessageResponse = serde_json::from_str(body).unwrap();
        assert!(!parsed.success);
        assert!(parsed.bot_message.is_none());
        assert_eq!(parsed.message.as_deref(), Some("Message cannot be empty"));
    }

    #[test]
    fn sender_serializes_lowercase() {
        let body = SendMessageRequest {
            text: "hello",
            sender: Sender::User,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"text":"hello","sender":"user"}"#);
    }

    #[test]
    fn auth_response_without_redirect() {
        let parsed: AuthResponse =
            serde_json::from_str(r#"{"success": true, "message": "Signup successful!"}"#).unwrap();
        assert!(parsed.success);
        assert!(parsed.redirect_url.is_none());
    }
}
