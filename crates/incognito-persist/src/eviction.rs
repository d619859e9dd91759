use crate::error::Result;
use crate::models::ChatStorage;

/// 4 MiB
pub const DEFAULT_MAX_BYTES: usize = 4 * 1024 * 1024;
pub const DEFAULT_MAX_CHATS: usize = 50;
pub const DEFAULT_FALLBACK_CHATS: usize = 5;

/// Bounds applied to the persisted blob on every save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageLimits {
    /// Budget for the serialized store, its key and unrelated backend data
    pub max_bytes: usize,
    pub max_chats: usize,
    /// Chats kept when a write fails even after eviction
    pub fallback_chats: usize,
}

impl Default for StorageLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_chats: DEFAULT_MAX_CHATS,
            fallback_chats: DEFAULT_FALLBACK_CHATS,
        }
    }
}

/// Result of fitting a store into its limits
#[derive(Debug, Clone)]
pub struct Fitted {
    pub serialized: String,
    pub evicted: usize,
}

/// Evict oldest-by-`updated_at` chats until the store fits
///
/// Stops once the count is within `max_chats` and the serialized size plus
/// `reserved_bytes` is within `max_bytes`, or once no chats remain. A
/// dangling `active_chat_id` is cleared first.
///
/// `reserved_bytes` is everything the backend charges besides the blob
/// itself: the key and the data stored under other keys.
pub fn fit_to_limits(
    storage: &mut ChatStorage,
    limits: &StorageLimits,
    reserved_bytes: usize,
) -> Result<Fitted> {
    storage.clear_dangling_active();

    let mut evicted = 0;
    while storage.chats.len() > limits.max_chats {
        storage.evict_oldest();
        evicted += 1;
    }

    loop {
        let serialized = serde_json::to_string(storage)?;
        let fits = serialized.len() + reserved_bytes <= limits.max_bytes;

        if fits || storage.chats.is_empty() {
            if evicted > 0 {
                tracing::warn!(
                    evicted,
                    remaining = storage.chats.len(),
                    bytes = serialized.len(),
                    "Evicted chats to fit storage limits"
                );
            }
            return Ok(Fitted {
                serialized,
                evicted,
            });
        }

        storage.evict_oldest();
        evicted += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chat;
    use chrono::Duration;
    use incognito_llm::ChatMessage;

    fn storage_with(count: usize, body: &str) -> ChatStorage {
        let mut storage = ChatStorage::empty();
        for i in 0..count {
            let mut chat = Chat::new(format!("chat {}", i));
            chat.messages.push(ChatMessage::user(body));
            chat.updated_at = chat.updated_at - Duration::seconds((count - i) as i64);
            storage.upsert(chat);
        }
        storage
    }

    #[test]
    fn test_count_limit_keeps_newest() {
        let mut storage = storage_with(60, "x");
        let fitted = fit_to_limits(&mut storage, &StorageLimits::default(), 0).unwrap();

        assert_eq!(fitted.evicted, 10);
        assert_eq!(storage.chats.len(), 50);
        assert!(storage.chats.iter().all(|c| c.title != "chat 9"));
        assert_eq!(storage.chats[0].title, "chat 10");
    }

    #[test]
    fn test_size_limit() {
        let mut storage = storage_with(10, &"y".repeat(1000));
        let limits = StorageLimits {
            max_bytes: 5_000,
            ..StorageLimits::default()
        };

        let fitted = fit_to_limits(&mut storage, &limits, 1_000).unwrap();

        assert!(fitted.serialized.len() + 1_000 <= 5_000);
        assert!(fitted.evicted > 0);
        assert_eq!(storage.chats.last().unwrap().title, "chat 9");
    }

    #[test]
    fn test_nothing_fits_clears_everything() {
        let mut storage = storage_with(3, "z");
        storage.active_chat_id = Some(storage.chats[1].id.clone());
        let limits = StorageLimits {
            max_bytes: 10,
            ..StorageLimits::default()
        };

        let fitted = fit_to_limits(&mut storage, &limits, 0).unwrap();

        assert_eq!(fitted.evicted, 3);
        assert!(storage.chats.is_empty());
        assert_eq!(storage.active_chat_id, None);
    }
}
