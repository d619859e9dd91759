use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::models::ChatStorage;

/// Receives the store contents after every successful write
///
/// Lets other views of the same store (another window, a sidebar) re-read
/// without polling.
#[async_trait]
pub trait StorageObserver: Send + Sync {
    async fn storage_changed(&self, storage: &ChatStorage);
}

/// Handle returned by `ChatStore::subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(pub(crate) u64);

/// Observer forwarding every change into a broadcast channel
pub struct ChannelObserver {
    sender: broadcast::Sender<ChatStorage>,
}

impl ChannelObserver {
    pub fn new(capacity: usize) -> (Arc<Self>, broadcast::Receiver<ChatStorage>) {
        let (sender, receiver) = broadcast::channel(capacity);
        (Arc::new(Self { sender }), receiver)
    }
}

#[async_trait]
impl StorageObserver for ChannelObserver {
    async fn storage_changed(&self, storage: &ChatStorage) {
        // No receivers left is not an error for the store
        let _ = self.sender.send(storage.clone());
    }
}
