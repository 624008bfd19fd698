// Storage module for persistent agent data
pub mod agent_store;

pub use agent_store::*;

use std::io;

/// Errors raised by the agent store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The store was used before `connect()`; a programming error, not a
    /// transient failure.
    #[error("persistence not connected")]
    NotConnected,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Current UTC time in the RFC 3339 form used for every stored timestamp.
pub fn now_ts() -> String {
    chrono::Utc::now().to_rfc3339()
}
