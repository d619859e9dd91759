use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::StorageBackend;
use crate::error::{PersistError, Result};

const EXTENSION: &str = "json";

/// Directory-backed store, one `<key>.json` file per key
///
/// Writes go through a temporary file and a rename so a crash never leaves a
/// half-written blob behind.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    quota: Option<usize>,
}

impl FileBackend {
    /// Open (creating if needed) the storage directory
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::debug!(dir = %dir.display(), "Opened file storage");
        Ok(Self { dir, quota: None })
    }

    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(PersistError::Unavailable(format!("invalid storage key: {}", key)));
        }
        Ok(self.dir.join(format!("{}.{}", key, EXTENSION)))
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)?).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;

        if let Some(limit) = self.quota {
            let needed = self.foreign_bytes(key).await? + key.len() + value.len();
            if needed > limit {
                return Err(PersistError::QuotaExceeded { needed, limit });
            }
        }

        let tmp = path.with_extension(format!("{}.tmp", EXTENSION));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn foreign_bytes(&self, key: &str) -> Result<usize> {
        let mut total = 0usize;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem == key {
                continue;
            }
            total += stem.len() + entry.metadata().await?.len() as usize;
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip_and_foreign_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path().join("store")).await.unwrap();

        assert_eq!(backend.read("chats").await.unwrap(), None);
        backend.write("chats", "{}").await.unwrap();
        backend.write("other", "12345").await.unwrap();

        assert_eq!(backend.read("chats").await.unwrap().as_deref(), Some("{}"));
        assert_eq!(backend.foreign_bytes("chats").await.unwrap(), "other".len() + 5);
    }

    #[tokio::test]
    async fn test_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).await.unwrap();

        assert!(backend.write("../escape", "x").await.is_err());
    }

    #[tokio::test]
    async fn test_quota() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).await.unwrap().with_quota(8);

        assert!(backend.write("k", "1234567").await.is_ok());
        assert!(matches!(
            backend.write("k", "12345678").await,
            Err(PersistError::QuotaExceeded { .. })
        ));
        assert_eq!(backend.read("k").await.unwrap().as_deref(), Some("1234567"));
    }
}
