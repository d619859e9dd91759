use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Upstream is not configured: {0} is missing")]
    MissingCredentials(&'static str),

    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Status code reported by the upstream service, if the failure came from one
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            LlmError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;
