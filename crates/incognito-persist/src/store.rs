use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::backend::StorageBackend;
use crate::builder::ChatStoreBuilder;
use crate::eviction::{fit_to_limits, StorageLimits};
use crate::models::{Chat, ChatStorage};
use crate::observer::{StorageObserver, Subscription};

/// Fixed key the whole store lives under
pub const STORAGE_KEY: &str = "incognito_chats";

/// What a save actually did
///
/// Informational only: saving never fails from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written in full after evicting `evicted` chats
    Saved { evicted: usize },
    /// The write failed; only the `kept` most recent chats were written
    Fallback { kept: usize },
    /// Neither the full nor the fallback write went through
    Failed,
    /// The backend cannot persist anything
    Skipped,
}

impl SaveOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. } | SaveOutcome::Fallback { .. })
    }
}

type ObserverList = Vec<(Subscription, Arc<dyn StorageObserver>)>;

/// Best-effort, size-bounded chat history
///
/// Every operation re-reads the blob, applies its change and writes it back,
/// so the last writer wins when several stores share one backend.
pub struct ChatStore {
    backend: Arc<dyn StorageBackend>,
    key: String,
    limits: StorageLimits,
    observers: RwLock<ObserverList>,
    next_subscription: AtomicU64,
}

impl ChatStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::from_parts(backend, STORAGE_KEY.to_string(), StorageLimits::default())
    }

    pub fn builder() -> ChatStoreBuilder {
        ChatStoreBuilder::new()
    }

    pub(crate) fn from_parts(
        backend: Arc<dyn StorageBackend>,
        key: String,
        limits: StorageLimits,
    ) -> Self {
        Self {
            backend,
            key,
            limits,
            observers: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    pub fn limits(&self) -> &StorageLimits {
        &self.limits
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Persisted store, or an empty one when absent, unreadable or corrupt
    pub async fn load(&self) -> ChatStorage {
        if !self.backend.is_persistent() {
            return ChatStorage::empty();
        }

        match self.backend.read(&self.key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(storage) => storage,
                Err(e) => {
                    tracing::warn!("Stored chats are corrupt, starting empty: {}", e);
                    ChatStorage::empty()
                }
            },
            Ok(None) => ChatStorage::empty(),
            Err(e) => {
                tracing::warn!("Failed to read stored chats, starting empty: {}", e);
                ChatStorage::empty()
            }
        }
    }

    /// Evict, write and notify observers
    pub async fn save(&self, mut storage: ChatStorage) -> SaveOutcome {
        if !self.backend.is_persistent() {
            return SaveOutcome::Skipped;
        }

        let foreign = match self.backend.foreign_bytes(&self.key).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to measure unrelated stored data: {}", e);
                0
            }
        };

        // Backends charge the key against their quota as well
        let reserved = foreign + self.key.len();
        let fitted = match fit_to_limits(&mut storage, &self.limits, reserved) {
            Ok(fitted) => fitted,
            Err(e) => {
                tracing::error!("Failed to serialize chats: {}", e);
                return SaveOutcome::Failed;
            }
        };

        match self.backend.write(&self.key, &fitted.serialized).await {
            Ok(()) => {
                tracing::debug!(
                    chats = storage.chats.len(),
                    bytes = fitted.serialized.len(),
                    "Saved chats"
                );
                self.notify(&storage).await;
                SaveOutcome::Saved {
                    evicted: fitted.evicted,
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to save chats, keeping the {} most recent: {}",
                    self.limits.fallback_chats,
                    e
                );
                self.write_fallback(&storage).await
            }
        }
    }

    async fn write_fallback(&self, storage: &ChatStorage) -> SaveOutcome {
        let fallback = storage.most_recent(self.limits.fallback_chats);

        let serialized = match serde_json::to_string(&fallback) {
            Ok(serialized) => serialized,
            Err(e) => {
                tracing::error!("Failed to serialize fallback chats: {}", e);
                return SaveOutcome::Failed;
            }
        };

        match self.backend.write(&self.key, &serialized).await {
            Ok(()) => {
                self.notify(&fallback).await;
                SaveOutcome::Fallback {
                    kept: fallback.chats.len(),
                }
            }
            Err(e) => {
                tracing::error!("Failed to save fallback chats: {}", e);
                SaveOutcome::Failed
            }
        }
    }

    /// New, unsaved chat
    pub fn create_chat(&self, title: impl Into<String>) -> Chat {
        Chat::new(title)
    }

    pub async fn upsert_chat(&self, chat: Chat) -> SaveOutcome {
        let mut storage = self.load().await;
        storage.upsert(chat);
        storage.touch();
        self.save(storage).await
    }

    pub async fn delete_chat(&self, chat_id: &str) -> SaveOutcome {
        let mut storage = self.load().await;
        if storage.remove(chat_id).is_none() {
            tracing::debug!(chat_id, "Deleting unknown chat");
        }
        storage.touch();
        self.save(storage).await
    }

    pub async fn get_chat(&self, chat_id: &str) -> Option<Chat> {
        self.load()
            .await
            .chats
            .into_iter()
            .find(|c| c.id == chat_id)
    }

    pub async fn set_active_chat(&self, chat_id: Option<&str>) -> SaveOutcome {
        let mut storage = self.load().await;
        storage.active_chat_id = chat_id.map(str::to_string);
        storage.touch();
        self.save(storage).await
    }

    /// Chats, most recently updated first
    pub async fn list_chats(&self) -> Vec<Chat> {
        self.load().await.by_recency()
    }

    pub fn subscribe(&self, observer: Arc<dyn StorageObserver>) -> Subscription {
        let subscription = Subscription(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.observers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((subscription, observer));
        subscription
    }

    /// Returns false when the subscription was already gone
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut observers = self
            .observers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = observers.len();
        observers.retain(|(s, _)| *s != subscription);
        observers.len() != before
    }

    async fn notify(&self, storage: &ChatStorage) {
        let observers: Vec<Arc<dyn StorageObserver>> = self
            .observers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in observers {
            observer.storage_changed(storage).await;
        }
    }
}
