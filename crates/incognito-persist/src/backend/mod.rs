mod file;
mod memory;
mod null;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use null::NullBackend;

use async_trait::async_trait;

use crate::error::Result;

/// Key/value port the chat store persists through
///
/// Implementations provide string blobs under string keys. Sizes are counted
/// in bytes of the stored values plus their keys.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read the blob stored under `key`
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob stored under `key`
    ///
    /// May fail with `PersistError::QuotaExceeded`.
    async fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Bytes occupied by every entry other than `key`
    async fn foreign_bytes(&self, key: &str) -> Result<usize>;

    /// False when there is nowhere to persist to
    fn is_persistent(&self) -> bool {
        true
    }
}
