use gloo_net::http::Request;

use crate::error::ApiError;
use crate::models::{
    AuthResponse, ChatId, ChatListResponse, ChatSummary, CreateChatRequest, LoginRequest,
    LogoutResponse, Message, MessageListResponse, SendMessageRequest, SendMessageResponse, Sender,
    SignupRequest,
};

/// Base URL of the backend API. Empty: the app is served by the same origin.
const API_BASE: &str = "";

/// Fetches the sidebar chat list, most recently updated first.
pub async fn fetch_chats() -> Result<Vec<ChatSummary>, ApiError> {
    let resp = Request::get(&format!("{API_BASE}/api/chats"))
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(ApiError::Status(resp.status()));
    }

    resp.json::<ChatListResponse>()
        .await
        .map(|body| body.chats)
        .map_err(|e| ApiError::Parse(e.to_string()))
}

/// Creates a chat and returns the server's canonical `{id, title}`.
pub async fn create_chat(title: &str) -> Result<ChatSummary, ApiError> {
    let resp = Request::post(&format!("{API_BASE}/api/chats"))
        .json(&CreateChatRequest { title })
        .map_err(|e| ApiError::Serialize(e.to_string()))?
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(ApiError::Status(resp.status()));
    }

    resp.json::<ChatSummary>()
        .await
        .map_err(|e| ApiError::Parse(e.to_string()))
}

/// Fetches the full message history of one chat, oldest first.
pub async fn fetch_messages(id: &ChatId) -> Result<Vec<Message>, ApiError> {
    let resp = Request::get(&format!("{API_BASE}/api/chats/{id}/messages"))
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(ApiError::Status(resp.status()));
    }

    resp.json::<MessageListResponse>()
        .await
        .map(|body| body.messages)
        .map_err(|e| ApiError::Parse(e.to_string()))
}

/// Posts a user message and waits for the bot's reply. The semantic outcome
/// (`success`/`bot_message`/`message`) is left to the caller.
pub async fn send_chat_message(id: &ChatId, text: &str) -> Result<SendMessageResponse, ApiError> {
    let body = SendMessageRequest {
        text,
        sender: Sender::User,
    };

    let resp = Request::post(&format!("{API_BASE}/api/chats/{id}/messages"))
        .json(&body)
        .map_err(|e| ApiError::Serialize(e.to_string()))?
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(ApiError::Status(resp.status()));
    }

    resp.json::<SendMessageResponse>()
        .await
        .map_err(|e| ApiError::Parse(e.to_string()))
}

/// Deletes a chat and all its messages. Only the status code matters.
pub async fn delete_chat(id: &ChatId) -> Result<(), ApiError> {
    let resp = Request::delete(&format!("{API_BASE}/api/chats/{id}"))
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(ApiError::Status(resp.status()));
    }

    Ok(())
}

/// Ends the server session. The caller performs the redirect.
pub async fn logout() -> Result<LogoutResponse, ApiError> {
    let resp = Request::get(&format!("{API_BASE}/api/logout"))
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(ApiError::Status(resp.status()));
    }

    resp.json::<LogoutResponse>()
        .await
        .map_err(|e| ApiError::Parse(e.to_string()))
}

/// Registers a new account. A `success: false` body (duplicate email, weak
/// password, …) arrives as `Ok` with the server's message.
pub async fn signup(name: &str, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
    let body = SignupRequest {
        name,
        email,
        password,
    };

    let resp = Request::post(&format!("{API_BASE}/api/signup"))
        .json(&body)
        .map_err(|e| ApiError::Serialize(e.to_string()))?
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    resp.json::<AuthResponse>()
        .await
        .map_err(|e| ApiError::Parse(e.to_string()))
}

/// Signs in; on success the response carries the post-login redirect URL.
pub async fn login(email: &str, password: &str) -> Result<AuthResponse, ApiError> {
    let body = LoginRequest { email, password };

    let resp = Request::post(&format!("{API_BASE}/api/login"))
        .json(&body)
        .map_err(|e| ApiError::Serialize(e.to_string()))?
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    resp.json::<AuthResponse>()
        .await
        .map_err(|e| ApiError::Parse(e.to_string()))
}
