//! Key-value persistence for settings that outlive one command.
//!
//! Components never reach for a global cache: they receive a [`KVStore`]
//! (usually wrapped in a [`PageCache`]) when they are constructed.
//! [`MemoryStore`] is for tests, [`RedbStore`] for durable use.

pub mod cache;
pub mod memory;
pub mod redb;

use thiserror::Error;

/// Errors that can occur in KV store operations.
#[derive(Error, Debug)]
pub enum KVError {
    #[error("kv: storage error: {0}")]
    Storage(String),

    #[error("kv: serialization error: {0}")]
    Serialization(String),
}

/// Result type for KV operations.
pub type KVResult<T> = Result<T, KVError>;

/// String-keyed byte store.
pub trait KVStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &str) -> KVResult<Option<Vec<u8>>>;

    /// Set a key-value pair. The write is durable when this returns.
    fn set(&self, key: &str, value: &[u8]) -> KVResult<()>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> KVResult<()>;

    /// All pairs whose key starts with `prefix`, sorted by key.
    fn scan(&self, prefix: &str) -> KVResult<Vec<(String, Vec<u8>)>>;
}

pub use cache::PageCache;
pub use memory::MemoryStore;
pub use redb::RedbStore;
