//! Directory-backed storage: one file per entry.

use super::{SessionStorage, StorageError, StorageResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory-backed storage.
///
/// Each entry is a file named after its key. Writes go to a temporary file
/// first and are renamed into place, so a crash mid-write leaves the previous
/// value (or nothing) rather than a truncated one.
///
/// # Example
///
/// ```no_run
/// use ipgate_auth::storage::FileStorage;
///
/// let storage = FileStorage::new("/home/me/.local/share/ipgate");
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn io_error(key: &str, source: std::io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl SessionStorage for FileStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Self::io_error(key, e))?;

        let target = self.path_for(key);
        let staging = self.dir.join(format!(".{key}.tmp"));

        tokio::fs::write(&staging, value)
            .await
            .map_err(|e| Self::io_error(key, e))?;
        tokio::fs::rename(&staging, &target)
            .await
            .map_err(|e| Self::io_error(key, e))
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(Self::io_error(key, e)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));
        assert_eq!(storage.get("accessToken").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        storage.set("tokenType", "Bearer").await.unwrap();
        assert_eq!(
            storage.get("tokenType").await.unwrap().as_deref(),
            Some("Bearer")
        );

        storage.set("tokenType", "Token").await.unwrap();
        assert_eq!(
            storage.get("tokenType").await.unwrap().as_deref(),
            Some("Token")
        );

        storage.remove("tokenType").await.unwrap();
        storage.remove("tokenType").await.unwrap();
        assert_eq!(storage.get("tokenType").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_no_staging_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.set("user", "{}").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["user".to_string()]);
    }
}
