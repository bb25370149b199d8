use leptos::prelude::*;

use crate::models::{ChatId, ChatSummary, Message};

/// Reactive session state, one instance per [`crate::session::ChatSession`].
///
/// Invariant: `selected_chat`, when set, names an id present in `chats`; the
/// controller falls back to the first chat (or no selection) whenever an
/// operation would break that.
#[derive(Clone, Copy)]
pub struct SessionState {
    // ── Read signals (for components to subscribe to) ───────────────────────
    pub chats: ReadSignal<Vec<ChatSummary>>,
    pub selected_chat: ReadSignal<Option<ChatId>>,
    pub messages: ReadSignal<Vec<Message>>,
    /// Inline error shown in place of the message list when a fetch fails.
    pub messages_error: ReadSignal<Option<String>>,
    /// True between sending a message and receiving the bot's reply.
    pub pending_reply: ReadSignal<bool>,
    /// Gate for sending: flips true once a PDF upload has succeeded.
    pub uploaded_file_ready: ReadSignal<bool>,

    // ── Write signals (for mutating state) ──────────────────────────────────
    pub set_chats: WriteSignal<Vec<ChatSummary>>,
    pub set_selected_chat: WriteSignal<Option<ChatId>>,
    pub set_messages: WriteSignal<Vec<Message>>,
    pub set_messages_error: WriteSignal<Option<String>>,
    pub set_pending_reply: WriteSignal<bool>,
    pub set_uploaded_file_ready: WriteSignal<bool>,
}

impl SessionState {
    pub fn new() -> Self {
        let (chats, set_chats) = signal(Vec::<ChatSummary>::new());
        let (selected_chat, set_selected_chat) = signal(None::<ChatId>);
        let (messages, set_messages) = signal(Vec::<Message>::new());
        let (messages_error, set_messages_error) = signal(None::<String>);
        let (pending_reply, set_pending_reply) = signal(false);
        let (uploaded_file_ready, set_uploaded_file_ready) = signal(false);

        SessionState {
            chats,
            selected_chat,
            messages,
            messages_error,
            pending_reply,
            uploaded_file_ready,
            set_chats,
            set_selected_chat,
            set_messages,
            set_messages_error,
            set_pending_reply,
            set_uploaded_file_ready,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::new()
    }
}
