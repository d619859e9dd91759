use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::StorageBackend;
use crate::error::{PersistError, Result};

/// In-process backend with an optional byte quota
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes that would push the total size over `bytes`
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Seed an entry (unrelated data or a pre-existing blob)
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.lock().insert(key.into(), value.into());
        self
    }

    /// Current raw value under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn foreign(entries: &HashMap<String, String>, key: &str) -> usize {
        entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock();

        if let Some(limit) = self.quota {
            let needed = Self::foreign(&entries, key) + key.len() + value.len();
            if needed > limit {
                return Err(PersistError::QuotaExceeded { needed, limit });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn foreign_bytes(&self, key: &str) -> Result<usize> {
        Ok(Self::foreign(&self.lock(), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_write() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.read("k").await.unwrap(), None);

        backend.write("k", "v").await.unwrap();
        assert_eq!(backend.read("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_quota() {
        let backend = MemoryBackend::new().with_quota(10).with_entry("x", "1234");

        assert_eq!(backend.foreign_bytes("k").await.unwrap(), 5);
        assert!(backend.write("k", "1234").await.is_ok());
        assert!(matches!(
            backend.write("k", "12345").await,
            Err(PersistError::QuotaExceeded { needed: 11, limit: 10 })
        ));
    }
}
