use thiserror::Error;

/// Everything that can go wrong talking to the backend or the browser's
/// storage. Every variant renders as a short, user-presentable string; the
/// controllers decide whether it lands in a toast or an inline bubble.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {0}")]
    Status(u16),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// A 2xx response whose body reported `success: false`; carries the
    /// server's own message verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("Browser storage is unavailable")]
    Storage,
}
