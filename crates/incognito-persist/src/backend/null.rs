use async_trait::async_trait;

use super::StorageBackend;
use crate::error::Result;

/// Backend for environments without persistence
///
/// Reads find nothing and writes are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

#[async_trait]
impl StorageBackend for NullBackend {
    async fn read(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn write(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    async fn foreign_bytes(&self, _key: &str) -> Result<usize> {
        Ok(0)
    }

    fn is_persistent(&self) -> bool {
        false
    }
}
