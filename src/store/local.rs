use async_trait::async_trait;
use web_sys::{Storage, window};

use super::{ChatStore, selection};
use crate::error::ApiError;
use crate::models::{ChatId, ChatSummary, Message};

const CHATS_KEY: &str = "pdfchat.chats";

/// Offline store: chats and message histories live in localStorage and the
/// "bot" answers with a canned reply. Selected with the `offline` cargo
/// feature; it exists so the UI stays fully usable without a backend.
pub struct LocalStore;

const OFFLINE_REPLY: &str =
    "You're offline right now, so I can't answer questions about your document. \
     Your message has been saved.";

fn storage() -> Result<Storage, ApiError> {
    window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or(ApiError::Storage)
}

fn messages_key(id: &ChatId) -> String {
    format!("pdfchat.messages.{id}")
}

fn read_chats(storage: &Storage) -> Vec<ChatSummary> {
    storage
        .get_item(CHATS_KEY)
        .ok()
        .flatten()
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

fn write_chats(storage: &Storage, chats: &[ChatSummary]) -> Result<(), ApiError> {
    let json = serde_json::to_string(chats).map_err(|e| ApiError::Serialize(e.to_string()))?;
    storage
        .set_item(CHATS_KEY, &json)
        .map_err(|_| ApiError::Storage)
}

fn read_messages(storage: &Storage, id: &ChatId) -> Vec<Message> {
    storage
        .get_item(&messages_key(id))
        .ok()
        .flatten()
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

fn write_messages(storage: &Storage, id: &ChatId, messages: &[Message]) -> Result<(), ApiError> {
    let json = serde_json::to_string(messages).map_err(|e| ApiError::Serialize(e.to_string()))?;
    storage
        .set_item(&messages_key(id), &json)
        .map_err(|_| ApiError::Storage)
}

/// Smallest positive integer not already used as an id. Ids stay numeric so
/// offline data looks like the backend's.
fn mint_id(chats: &[ChatSummary]) -> ChatId {
    let max = chats
        .iter()
        .filter_map(|c| c.id.as_str().parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    ChatId::from((max + 1).to_string())
}

#[async_trait(?Send)]
impl ChatStore for LocalStore {
    async fn list_chats(&self) -> Result<Vec<ChatSummary>, ApiError> {
        Ok(read_chats(&storage()?))
    }

    async fn create_chat(&self, title: &str) -> Result<ChatSummary, ApiError> {
        let storage = storage()?;
        let mut chats = read_chats(&storage);
        let chat = ChatSummary {
            id: mint_id(&chats),
            title: title.to_string(),
        };
        chats.insert(0, chat.clone());
        write_chats(&storage, &chats)?;
        Ok(chat)
    }

    async fn messages(&self, id: &ChatId) -> Result<Vec<Message>, ApiError> {
        Ok(read_messages(&storage()?, id))
    }

    async fn send_message(&self, id: &ChatId, text: &str) -> Result<Message, ApiError> {
        let storage = storage()?;
        let mut messages = read_messages(&storage, id);
        messages.push(Message::user(text));
        let reply = Message::bot(OFFLINE_REPLY);
        messages.push(reply.clone());
        write_messages(&storage, id, &messages)?;
        Ok(reply)
    }

    async fn delete_chat(&self, id: &ChatId) -> Result<(), ApiError> {
        let storage = storage()?;
        let mut chats = read_chats(&storage);
        chats.retain(|c| &c.id != id);
        write_chats(&storage, &chats)?;
        let _ = storage.remove_item(&messages_key(id));
        Ok(())
    }

    fn load_selection(&self) -> Option<ChatId> {
        selection::load()
    }

    fn store_selection(&self, id: Option<&ChatId>) {
        selection::store(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_id_skips_past_existing_numeric_ids() {
        let chats = vec![
            ChatSummary {
                id: ChatId::from("3"),
                title: "A".into(),
            },
            ChatSummary {
                id: ChatId::from("11"),
                title: "B".into(),
            },
        ];
        assert_eq!(mint_id(&chats), ChatId::from("12"));
    }

    #[test]
    fn mint_id_starts_at_one() {
        assert_eq!(mint_id(&[]), ChatId::from("1"));
    }
}
