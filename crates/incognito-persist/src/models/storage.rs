use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chat::{timestamp_now, Chat};

/// Root object persisted under the store key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStorage {
    pub chats: Vec<Chat>,
    pub active_chat_id: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl ChatStorage {
    pub fn empty() -> Self {
        Self {
            chats: Vec::new(),
            active_chat_id: None,
            updated_at: timestamp_now(),
        }
    }

    pub fn chat(&self, id: &str) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == id)
    }

    /// Insert or replace by id
    pub fn upsert(&mut self, chat: Chat) {
        match self.chats.iter_mut().find(|c| c.id == chat.id) {
            Some(existing) => *existing = chat,
            None => self.chats.push(chat),
        }
    }

    /// Remove by id, clearing the active pointer if it referenced the chat
    pub fn remove(&mut self, id: &str) -> Option<Chat> {
        let idx = self.chats.iter().position(|c| c.id == id)?;
        if self.active_chat_id.as_deref() == Some(id) {
            self.active_chat_id = None;
        }
        Some(self.chats.remove(idx))
    }

    pub fn touch(&mut self) {
        self.updated_at = timestamp_now();
    }

    /// Null out `active_chat_id` when it points at a chat that does not exist
    ///
    /// Returns true when the pointer was cleared.
    pub fn clear_dangling_active(&mut self) -> bool {
        let dangling = match self.active_chat_id.as_deref() {
            Some(id) => self.chat(id).is_none(),
            None => false,
        };
        if dangling {
            self.active_chat_id = None;
        }
        dangling
    }

    /// Remove the least recently updated chat
    pub fn evict_oldest(&mut self) -> Option<Chat> {
        let idx = self
            .chats
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| c.updated_at)
            .map(|(idx, _)| idx)?;
        let evicted = self.chats.remove(idx);
        self.clear_dangling_active();
        Some(evicted)
    }

    /// Chats ordered most recently updated first
    pub fn by_recency(&self) -> Vec<Chat> {
        let mut chats = self.chats.clone();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        chats
    }

    /// Copy keeping only the `n` most recently updated chats
    pub fn most_recent(&self, n: usize) -> Self {
        let mut chats = self.by_recency();
        chats.truncate(n);

        let mut trimmed = Self {
            chats,
            active_chat_id: self.active_chat_id.clone(),
            updated_at: self.updated_at,
        };
        trimmed.clear_dangling_active();
        trimmed
    }
}

impl Default for ChatStorage {
    fn default() -> Self {
        Self::empty()
    }
}
