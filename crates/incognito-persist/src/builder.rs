use std::sync::Arc;

use crate::backend::{MemoryBackend, StorageBackend};
use crate::eviction::StorageLimits;
use crate::store::{ChatStore, STORAGE_KEY};

pub struct ChatStoreBuilder {
    backend: Option<Arc<dyn StorageBackend>>,
    key: String,
    limits: StorageLimits,
}

impl ChatStoreBuilder {
    pub fn new() -> Self {
        Self {
            backend: None,
            key: STORAGE_KEY.to_string(),
            limits: StorageLimits::default(),
        }
    }

    pub fn backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn max_bytes(mut self, bytes: usize) -> Self {
        self.limits.max_bytes = bytes;
        self
    }

    pub fn max_chats(mut self, count: usize) -> Self {
        self.limits.max_chats = count;
        self
    }

    pub fn fallback_chats(mut self, count: usize) -> Self {
        self.limits.fallback_chats = count;
        self
    }

    /// Build the store; without a backend it lives in memory
    pub fn build(self) -> ChatStore {
        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(MemoryBackend::new()));
        ChatStore::from_parts(backend, self.key, self.limits)
    }
}

impl Default for ChatStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
