pub mod types;
pub mod traits;
pub mod error;
pub mod buffer_utils;
pub mod openai;
pub mod attestation;

pub use traits::{ByteStream, ChatClient, ChatOptions, ChatRequest, ChatResponse};
pub use error::{LlmError, Result};
pub use buffer_utils::{relay_sse, RelayBuffer, RelayRecord, RelayStream};
pub use openai::CompletionsClient;
pub use attestation::AttestationClient;
pub use types::{
    Attachment, AttachmentMeta, ChatMessage, ChatMode, Message, ProxyMessage, ProxyReply,
    ProxyRequest, Role,
};
