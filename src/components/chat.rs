use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::models::{Message, Sender};
use crate::session::ChatSession;

/// Main chat area: header, message history, and the input box.
#[component]
pub fn ChatArea() -> impl IntoView {
    let session = ChatSession::expect();
    let state = session.state;

    let header = move || {
        state
            .selected_chat
            .get()
            .and_then(|id| {
                state
                    .chats
                    .get()
                    .iter()
                    .find(|c| c.id == id)
                    .map(|c| c.title.clone())
            })
            .unwrap_or_else(|| "PDF Chat".to_string())
    };

    view! {
        <main class="chat-area">
            <div class="chat-header">{header}</div>

            <div class="messages-container">
                {move || {
                    if state.selected_chat.get().is_none() {
                        view! {
                            <div class="empty-state">
                                "Upload a PDF and start a new chat to ask questions about it."
                            </div>
                        }
                        .into_any()
                    } else {
                        view! {
                            // Inline error shown in place of messages when a
                            // history fetch fails.
                            {move || {
                                state.messages_error.get().map(|err| {
                                    view! { <div class="messages-error">{err}</div> }
                                })
                            }}
                            <For
                                each=move || {
                                    state.messages.get().into_iter().enumerate().collect::<Vec<_>>()
                                }
                                key=|(i, m)| (*i, m.text.clone())
                                let:entry
                            >
                                {
                                    let (_, message) = entry;
                                    view! { <MessageBubble message=message /> }
                                }
                            </For>
                            // Typing placeholder while the bot's reply is pending.
                            {move || {
                                state.pending_reply.get().then(|| {
                                    view! {
                                        <div class="message bot typing">
                                            <div class="role-label">"Assistant"</div>
                                            <div class="typing-dots">"…"</div>
                                        </div>
                                    }
                                })
                            }}
                        }
                        .into_any()
                    }
                }}
            </div>

            <ChatInput />
        </main>
    }
}

/// A single chat message bubble.
#[component]
fn MessageBubble(message: Message) -> impl IntoView {
    let mut css_class = match message.sender {
        Sender::User => "message user".to_string(),
        Sender::Bot => "message bot".to_string(),
    };
    if message.is_error {
        css_class.push_str(" error");
    }
    let label = match message.sender {
        Sender::User => "You",
        Sender::Bot => "Assistant",
    };

    view! {
        <div class=css_class>
            <div class="role-label">{label}</div>
            <div class="message-text">{message.text}</div>
        </div>
    }
}

/// Message input with textarea and send button.
#[component]
fn ChatInput() -> impl IntoView {
    let session = ChatSession::expect();
    let state = session.state;
    let (input, set_input) = signal(String::new());

    let is_sending = move || state.pending_reply.get();

    let send = {
        let session = session.clone();
        move || {
            let text = input.get_untracked();
            if text.trim().is_empty() || state.pending_reply.get_untracked() {
                return;
            }
            set_input.set(String::new());
            let session = session.clone();
            spawn_local(async move {
                session.send_message(text).await;
            });
        }
    };

    let send_on_key = send.clone();
    let on_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send_on_key();
        }
    };

    let on_click = move |_| {
        send();
    };

    view! {
        <div class="input-area">
            <div class="input-row">
                <textarea
                    rows="1"
                    placeholder="Ask something about your PDF… (Enter to send)"
                    prop:value=input
                    on:input=move |ev| {
                        set_input.set(event_target_value(&ev));
                    }
                    on:keydown=on_keydown
                    disabled=is_sending
                />
                <button
                    class="send-btn"
                    on:click=on_click
                    disabled=move || is_sending() || input.get().trim().is_empty()
                >
                    {move || if is_sending() { "Sending…" } else { "Send" }}
                </button>
            </div>
        </div>
    }
}
