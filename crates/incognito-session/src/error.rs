use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Proxy returned {status}: {message}")]
    Proxy { status: u16, message: String },

    #[error("Invalid proxy reply: {0}")]
    InvalidReply(String),

    #[error("Chat not found: {0}")]
    ChatNotFound(String),

    #[error("A request is already in flight")]
    Busy,
}

pub type Result<T> = std::result::Result<T, SessionError>;
