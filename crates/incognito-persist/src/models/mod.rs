mod chat;
mod storage;

pub use chat::{timestamp_now, Chat, DEFAULT_TITLE, TITLE_MAX_CHARS};
pub use storage::ChatStorage;
