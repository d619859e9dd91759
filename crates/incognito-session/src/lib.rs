pub mod backend;
pub mod error;
pub mod session;

pub use backend::{CompletionBackend, ProxyBackend};
pub use error::{Result, SessionError};
pub use session::{ChatSession, Exchange, APOLOGY, REGENERATE_APOLOGY};
