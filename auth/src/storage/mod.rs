//! Persistent storage for the session mirror.
//!
//! The session is persisted as three independent string entries (see
//! [`storage_keys`](crate::constants::storage_keys)). Backends only move
//! strings; parsing and validation belong to the
//! [`SessionStore`](crate::session_store::SessionStore).

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::future::Future;
use thiserror::Error;

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage backend failure.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("Storage I/O failed for {key}: {source}")]
    Io {
        /// Entry being accessed.
        key: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Backend refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// String key-value storage that survives process restarts.
///
/// # Implementation Notes
///
/// - A missing key is `Ok(None)`, not an error
/// - `remove` on a missing key succeeds
/// - Writes to a single key must be atomic (readers never see half a value)
pub trait SessionStorage: Send + Sync {
    /// Read an entry.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be read.
    fn get(&self, key: &str) -> impl Future<Output = StorageResult<Option<String>>> + Send;

    /// Write an entry, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = StorageResult<()>> + Send;

    /// Delete an entry.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be written.
    fn remove(&self, key: &str) -> impl Future<Output = StorageResult<()>> + Send;
}
