//! Directory-backed store shared between processes on one machine

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use crate::{SharedStore, StoreError, validate_key};

/// Suffix for temp files, unique across every handle in this process
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// One file per key under `base_path`
///
/// Writes go to a hidden temp file that is renamed over the key file, so a
/// reader sees either the old or the new value of a key, never a torn one.
/// Nothing spans keys.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Open or create a store at the given directory
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_path = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        debug!(?base_path, "Opened file store");
        Ok(Self { base_path })
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        self.base_path.join(format!(".{}.{}.{}.tmp", key, std::process::id(), seq))
    }

    async fn key_files(&self) -> Result<Vec<(String, PathBuf)>, StoreError> {
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if validate_key(&name).is_ok() && entry.file_type().await?.is_file() {
                files.push((name, entry.path()));
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl SharedStore for FileStore {
    async fn get(&self, key: &str) -> Result<String, StoreError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(value),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        let temp = self.temp_path(key);
        fs::write(&temp, value).await?;
        if let Err(e) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        debug!(key, value, "FileStore::set");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let files = self.key_files().await?;
        let count = files.len();
        for (_, path) in files {
            match fs::remove_file(&path).await {
                Ok(()) => {}
                // Another participant cleared it first
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        info!(count, base_path = ?self.base_path, "Cleared file store");
        Ok(())
    }

    async fn snapshot(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let mut map = BTreeMap::new();
        for (key, _) in self.key_files().await? {
            let value = self.get(&key).await?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_get_overwrite() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path().join("store")).unwrap();

        assert_eq!(store.get("sender").await.unwrap(), "");

        store.set("sender", "alice").await.unwrap();
        assert_eq!(store.get("sender").await.unwrap(), "alice");

        store.set("sender", "").await.unwrap();
        assert_eq!(store.get("sender").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_two_handles_see_same_keys() {
        let temp = TempDir::new().unwrap();
        let a = FileStore::open(temp.path()).unwrap();
        let b = FileStore::open(temp.path()).unwrap();

        a.set("status", "OPEN").await.unwrap();
        assert_eq!(b.get("status").await.unwrap(), "OPEN");
    }

    #[tokio::test]
    async fn test_clear_removes_only_keys() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        std::fs::create_dir(temp.path().join("nested")).unwrap();

        store.set("roster", "alice,bob").await.unwrap();
        store.set("status", "ACTIVE").await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.get("roster").await.unwrap(), "");
        assert!(store.snapshot().await.unwrap().is_empty());
        assert!(temp.path().join("nested").exists());
    }

    #[tokio::test]
    async fn test_snapshot_lists_keys() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        store.set("connection_count", "1").await.unwrap();
        store.set("sender", "alice").await.unwrap();

        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["connection_count"], "1");
        assert_eq!(snapshot["sender"], "alice");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_to_one_key() {
        let temp = TempDir::new().unwrap();
        let a = FileStore::open(temp.path()).unwrap();
        let b = FileStore::open(temp.path()).unwrap();

        let mut tasks = Vec::new();
        for _ in 0..200 {
            let a = a.clone();
            let b = b.clone();
            tasks.push(tokio::spawn(async move { a.set("setup_gate", "TRUE").await }));
            tasks.push(tokio::spawn(async move { b.set("setup_gate", "FALSE").await }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let value = a.get("setup_gate").await.unwrap();
        assert!(value == "TRUE" || value == "FALSE", "{:?}", value);

        // Every temp file was renamed away
        let leftovers: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|name| name.to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "{:?}", leftovers);
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        assert!(store.set("../outside", "x").await.is_err());
    }
}
