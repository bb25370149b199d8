use async_trait::async_trait;

use super::{ChatStore, selection};
use crate::api;
use crate::error::ApiError;
use crate::models::{ChatId, ChatSummary, Message};

/// The normal store: every operation is one REST call to the backend.
pub struct RestStore;

#[async_trait(?Send)]
impl ChatStore for RestStore {
    async fn list_chats(&self) -> Result<Vec<ChatSummary>, ApiError> {
        api::fetch_chats().await
    }

    async fn create_chat(&self, title: &str) -> Result<ChatSummary, ApiError> {
        api::create_chat(title).await
    }

    async fn messages(&self, id: &ChatId) -> Result<Vec<Message>, ApiError> {
        api::fetch_messages(id).await
    }

    async fn send_message(&self, id: &ChatId, text: &str) -> Result<Message, ApiError> {
        let resp = api::send_chat_message(id, text).await?;
        match resp.bot_message {
            Some(bot) if resp.success => Ok(Message::bot(bot.text)),
            // A 2xx body of any other shape is a refusal, not a reply.
            _ => Err(ApiError::Rejected(resp.message.unwrap_or_else(|| {
                "The assistant could not answer this message.".to_string()
            }))),
        }
    }

    async fn delete_chat(&self, id: &ChatId) -> Result<(), ApiError> {
        api::delete_chat(id).await
    }

    fn load_selection(&self) -> Option<ChatId> {
        selection::load()
    }

    fn store_selection(&self, id: Option<&ChatId>) {
        selection::store(id);
    }
}
