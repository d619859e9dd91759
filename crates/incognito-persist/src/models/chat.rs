use chrono::{DateTime, SubsecRound, Utc};
use incognito_llm::{ChatMessage, Role};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "New Chat";
pub const TITLE_MAX_CHARS: usize = 40;

/// Current time at the precision the store persists (milliseconds)
///
/// Keeps a freshly built chat equal to its own persisted copy.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// One conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    pub fn new(title: impl Into<String>) -> Self {
        let now = timestamp_now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Title shown for a conversation opened by `first_message`
    pub fn title_from(first_message: &str) -> String {
        let text = first_message.trim();
        if text.is_empty() {
            return DEFAULT_TITLE.to_string();
        }

        let mut title: String = text.chars().take(TITLE_MAX_CHARS).collect();
        if text.chars().count() > TITLE_MAX_CHARS {
            title.push_str("...");
        }
        title
    }

    /// First user message, if any
    pub fn first_user_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.role == Role::User)
    }

    /// Replace the message list and bump `updated_at`
    pub fn set_messages(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = timestamp_now();
    }
}

impl Default for Chat {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}
