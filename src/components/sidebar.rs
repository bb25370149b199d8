use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::upload::UploadPanel;
use super::{confirm, redirect_to};
use crate::api;
use crate::notify::Notifier;
use crate::session::ChatSession;

/// Sidebar: PDF upload, "New Chat", the chat list, and logout.
#[component]
pub fn Sidebar() -> impl IntoView {
    let session = ChatSession::expect();
    let session_sv = expect_context::<StoredValue<ChatSession, LocalStorage>>();
    let notify = Notifier::expect();
    let state = session.state;

    let on_new = {
        let session = session.clone();
        move |_| {
            let session = session.clone();
            spawn_local(async move {
                let _ = session.create_chat().await;
            });
        }
    };

    let on_logout = {
        let notify = notify.clone();
        move |_| {
            if !confirm("Log out of PDF Chat?") {
                return;
            }
            let notify = notify.clone();
            spawn_local(async move {
                match api::logout().await {
                    Ok(resp) if resp.success => {
                        redirect_to(resp.redirect.as_deref().unwrap_or("/login"));
                    }
                    Ok(resp) => {
                        notify.error(
                            resp.message
                                .unwrap_or_else(|| "Logout failed.".to_string()),
                        );
                    }
                    Err(e) => {
                        notify.error(format!("Could not log out. {e}"));
                    }
                }
            });
        }
    };

    view! {
        <aside class="sidebar">
            <div class="sidebar-header">
                <h1 class="app-title">"PDF Chat"</h1>
                <button class="new-chat-btn" on:click=on_new>
                    "+ New Chat"
                </button>
            </div>
            <UploadPanel />
            <div class="chat-list">
                {move || {
                    let chats = state.chats.get();
                    if chats.is_empty() {
                        view! {
                            <div class="chat-list-empty">"No chats yet"</div>
                        }
                        .into_any()
                    } else {
                        view! {
                            <For
                                each=move || state.chats.get()
                                key=|chat| chat.id.clone()
                                let:chat
                            >
                                {
                                    let session = session_sv.get_value();
                                    let title = chat.title.clone();
                                    let id_active = chat.id.clone();
                                    let id_select = chat.id.clone();
                                    let id_delete = chat.id.clone();
                                    let select_session = session.clone();
                                    view! {
                                        <div
                                            class="chat-item"
                                            class:active=move || {
                                                state.selected_chat.get().as_ref()
                                                    == Some(&id_active)
                                            }
                                            on:click=move |_| {
                                                let session = select_session.clone();
                                                let id = id_select.clone();
                                                spawn_local(async move {
                                                    session.select_chat(id).await;
                                                });
                                            }
                                        >
                                            <span class="chat-title">{title}</span>
                                            <button
                                                class="chat-delete"
                                                on:click=move |ev: ev::MouseEvent| {
                                                    ev.stop_propagation();
                                                    if !confirm(
                                                        "Delete this chat and all its messages?",
                                                    ) {
                                                        return;
                                                    }
                                                    let session = session.clone();
                                                    let id = id_delete.clone();
                                                    spawn_local(async move {
                                                        session.delete_chat(id).await;
                                                    });
                                                }
                                            >
                                                "×"
                                            </button>
                                        </div>
                                    }
                                }
                            </For>
                        }
                        .into_any()
                    }
                }}
            </div>
            <button class="logout-btn" on:click=on_logout>
                "Log out"
            </button>
        </aside>
    }
}
