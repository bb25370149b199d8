pub mod local;
pub mod rest;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{ChatId, ChatSummary, Message};

/// Where chats and messages live.
///
/// The controller only ever talks to this trait; the remote REST store and
/// the offline localStorage store implement it, and tests substitute a mock.
/// Futures are `?Send` because everything runs on the browser's single
/// thread.
#[async_trait(?Send)]
pub trait ChatStore {
    async fn list_chats(&self) -> Result<Vec<ChatSummary>, ApiError>;

    async fn create_chat(&self, title: &str) -> Result<ChatSummary, ApiError>;

    async fn messages(&self, id: &ChatId) -> Result<Vec<Message>, ApiError>;

    /// Delivers a user message and returns the bot's reply. A reply the
    /// backend refused to produce surfaces as [`ApiError::Rejected`] carrying
    /// the backend's message.
    async fn send_message(&self, id: &ChatId, text: &str) -> Result<Message, ApiError>;

    async fn delete_chat(&self, id: &ChatId) -> Result<(), ApiError>;

    /// Last selected chat, restored on page load. Synchronous: reads the
    /// address bar and localStorage only.
    fn load_selection(&self) -> Option<ChatId>;

    /// Durably remembers (or forgets) the selected chat and mirrors it into
    /// the address bar for deep links.
    fn store_selection(&self, id: Option<&ChatId>);
}

/// Selection persistence shared by both browser-backed stores: a localStorage
/// marker that survives reloads, plus a `?chat=<id>` query parameter kept in
/// sync via `history.replaceState` so the address stays shareable.
pub(crate) mod selection {
    use wasm_bindgen::JsValue;
    use web_sys::window;

    use crate::models::ChatId;

    const LAST_CHAT_KEY: &str = "pdfchat.last-chat-id";

    /// Deep link first, sticky marker second.
    pub fn load() -> Option<ChatId> {
        from_query().or_else(from_storage)
    }

    pub fn store(id: Option<&ChatId>) {
        if let Some(storage) = window().and_then(|w| w.local_storage().ok().flatten()) {
            let _ = match id {
                Some(id) => storage.set_item(LAST_CHAT_KEY, id.as_str()),
                None => storage.remove_item(LAST_CHAT_KEY),
            };
        }
        sync_url(id);
    }

    fn from_query() -> Option<ChatId> {
        let search = window()?.location().search().ok()?;
        let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
        params.get("chat").map(ChatId::from)
    }

    fn from_storage() -> Option<ChatId> {
        window()?
            .local_storage()
            .ok()
            .flatten()?
            .get_item(LAST_CHAT_KEY)
            .ok()
            .flatten()
            .map(ChatId::from)
    }

    fn sync_url(id: Option<&ChatId>) {
        let Some(window) = window() else { return };
        let location = window.location();
        let path = location.pathname().unwrap_or_else(|_| "/".to_string());
        let url = match id {
            Some(id) => format!(
                "{path}?chat={}",
                String::from(js_sys::encode_uri_component(id.as_str()))
            ),
            None => path,
        };
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&url));
        }
    }
}
