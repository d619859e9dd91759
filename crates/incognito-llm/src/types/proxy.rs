use serde::{Deserialize, Serialize};

use super::message::{Attachment, ChatMessage, Message, Role};

/// Interface mode selected by the user; decides the system preamble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    #[default]
    Chat,
    Agent,
    Mcp,
}

/// Message in a proxy request body, with full attachment contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyMessage {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl ProxyMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }
}

impl From<&ChatMessage> for ProxyMessage {
    fn from(msg: &ChatMessage) -> Self {
        ProxyMessage::new(msg.role, msg.content.clone())
    }
}

/// Body accepted by `POST /chat` and `POST /inference`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyRequest {
    pub messages: Vec<ProxyMessage>,
    #[serde(default)]
    pub mode: ChatMode,
}

/// Body returned by `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyReply {
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let req: ProxyRequest =
            serde_json::from_str(r#"{"messages":[{"role":"user","content":"Hello"}]}"#).unwrap();
        assert_eq!(req.mode, ChatMode::Chat);
        assert!(req.messages[0].attachments.is_empty());
    }

    #[test]
    fn test_reply_without_signature() {
        let reply = ProxyReply {
            message: Message::assistant("Hi"),
            signature: None,
        };
        let json = serde_json::to_string(&reply).unwrap();
        assert_eq!(json, r#"{"message":{"role":"assistant","content":"Hi"}}"#);
    }
}
