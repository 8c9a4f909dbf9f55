//! In-memory storage.

use super::{SessionStorage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory storage.
///
/// Clones share the same entries, so a test can hand one clone to a
/// `SessionStore`, drop the store, and build a new one from another clone to
/// simulate a process restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one entry (for tests).
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Overwrite an entry directly, bypassing failure injection (for tests).
    pub fn put(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Make every subsequent `set` fail (removals still succeed).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SessionStorage for MemoryStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!(
                "writes disabled while storing {key}"
            )));
        }
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_entries() {
        let storage = MemoryStorage::new();
        let other = storage.clone();

        storage.set("user", "{}").await.unwrap();
        assert_eq!(other.get("user").await.unwrap().as_deref(), Some("{}"));

        other.remove("user").await.unwrap();
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_fail_writes() {
        let storage = MemoryStorage::new();
        storage.fail_writes(true);
        assert!(storage.set("accessToken", "abc").await.is_err());
        assert!(storage.remove("accessToken").await.is_ok());

        storage.fail_writes(false);
        assert!(storage.set("accessToken", "abc").await.is_ok());
        assert_eq!(storage.len(), 1);
    }
}
