mod api;
mod components;
mod error;
mod models;
mod notify;
mod session;
mod state;
mod store;
mod upload;

use std::rc::Rc;

use leptos::mount::mount_to_body;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

use components::auth::AuthPage;
use components::chat::ChatArea;
use components::sidebar::Sidebar;
use components::toasts::ToastHost;
use notify::Notifier;
use session::ChatSession;
use store::ChatStore;

/// Root application component: wires one notifier and one chat session into
/// context and routes between the chat page and the auth page.
#[component]
fn App() -> impl IntoView {
    let notify = Notifier::provide();

    #[cfg(not(feature = "offline"))]
    let chat_store: Rc<dyn ChatStore> = Rc::new(store::rest::RestStore);
    #[cfg(feature = "offline")]
    let chat_store: Rc<dyn ChatStore> = Rc::new(store::local::LocalStore);

    ChatSession::provide(chat_store, notify);

    view! {
        <Router>
            <ToastHost />
            <Routes fallback=|| "Page not found.">
                <Route path=path!("/") view=ChatPage />
                <Route path=path!("/auth") view=AuthPage />
            </Routes>
        </Router>
    }
}

/// Authenticated chat page: sidebar plus chat area.
#[component]
fn ChatPage() -> impl IntoView {
    let session = ChatSession::expect();

    // Load chats on mount; the remembered selection is restored inside.
    let load = session.clone();
    spawn_local(async move {
        load.load_chats().await;
    });

    view! {
        <div class="app-container">
            <Sidebar />
            <ChatArea />
        </div>
    }
}

fn main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).expect("Failed to init logger");
    mount_to_body(App);
}
