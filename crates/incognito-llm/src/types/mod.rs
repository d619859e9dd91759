pub mod message;
pub mod proxy;

pub use message::{Attachment, AttachmentMeta, ChatMessage, Message, Role};
pub use proxy::{ChatMode, ProxyMessage, ProxyReply, ProxyRequest};
