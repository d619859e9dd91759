pub mod models;
pub mod backend;
pub mod eviction;
pub mod observer;
pub mod store;
pub mod error;
pub mod builder;

pub use models::{Chat, ChatStorage};
pub use backend::{FileBackend, MemoryBackend, NullBackend, StorageBackend};
pub use eviction::StorageLimits;
pub use observer::{ChannelObserver, StorageObserver, Subscription};
pub use store::{ChatStore, SaveOutcome, STORAGE_KEY};
pub use error::PersistError;
pub use builder::ChatStoreBuilder;
