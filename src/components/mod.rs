pub mod auth;
pub mod chat;
pub mod sidebar;
pub mod toasts;
pub mod upload;

/// Full-page navigation, used after login/logout.
pub(crate) fn redirect_to(url: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.location().set_href(url);
    }
}

/// Blocking confirmation dialog; `false` when dismissed or unavailable.
pub(crate) fn confirm(message: &str) -> bool {
    web_sys::window()
        .map(|w| w.confirm_with_message(message).unwrap_or(false))
        .unwrap_or(false)
}
