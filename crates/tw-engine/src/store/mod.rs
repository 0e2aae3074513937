//! Key-value stores that hold the save list between sessions.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Errors reported by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing data is not in the expected format.
    #[error("malformed store data: {0}")]
    Format(#[from] serde_json::Error),

    /// The store refused the operation (quota exceeded, access denied).
    #[error("{0}")]
    Unavailable(String),
}

/// A synchronous string key-value store.
///
/// Implementations are assumed fast and local; calls are never retried or
/// cancelled.
pub trait KeyValueStore {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}
