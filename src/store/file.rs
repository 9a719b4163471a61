use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use fd_lock::RwLock;
use std::fs::{self as std_fs, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::{StateStore, StoreError};

const LOCK_FILE: &str = ".lock";
const VALUE_EXTENSION: &str = "val";
// Longest encoded segment used as one path component.
const SEGMENT_LEN: usize = 128;

/// Directory-backed store: one file per key.
///
/// A key is stored under the URL-safe base64 of its bytes. Encodings longer
/// than one segment are split into nested directories of at most
/// `SEGMENT_LEN` characters, the last segment carrying the `.val` file.
/// Writers take an advisory lock on `<dir>/.lock` and land
/// each value through a temporary file and a rename, so a reader sees either
/// the old or the new bytes.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        debug!(root = ?root, "Opened file store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let encoded = URL_SAFE_NO_PAD.encode(key);
        let segments: Vec<&str> = if encoded.is_empty() {
            vec![""]
        } else {
            encoded
                .as_bytes()
                .chunks(SEGMENT_LEN)
                .filter_map(|chunk| std::str::from_utf8(chunk).ok())
                .collect()
        };

        let mut path = self.root.clone();
        if let Some((last, dirs)) = segments.split_last() {
            for dir in dirs {
                path.push(dir);
            }
            path.push(format!("{}.{}", last, VALUE_EXTENSION));
        }
        path
    }

    fn write_locked(root: &Path, target: &Path, value: &[u8]) -> Result<(), StoreError> {
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(root.join(LOCK_FILE))?;
        let mut lock = RwLock::new(lock_file);
        let _guard = lock.write().map_err(|e| StoreError::Lock {
            reason: e.to_string(),
        })?;

        if let Some(parent) = target.parent() {
            std_fs::create_dir_all(parent)?;
        }
        let temp = target.with_extension("tmp");
        let mut file = File::create(&temp)?;
        file.write_all(value)?;
        file.sync_all()?;
        std_fs::rename(&temp, target)?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => {
                debug!(key = %key, bytes = bytes.len(), "file store get");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(key = %key, "file store get: absent");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let root = self.root.clone();
        let target = self.path_for(key);
        let value = value.to_vec();
        let bytes = value.len();

        tokio::task::spawn_blocking(move || Self::write_locked(&root, &target, &value))
            .await
            .map_err(|e| StoreError::Backend(format!("write task failed: {e}")))??;

        debug!(key = %key, bytes, "file store put");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_round_trip_arbitrary_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        store.put("acme/state", b"Imp_PO_Draft").await.unwrap();
        store.put("../escape?", b"v").await.unwrap();

        assert_eq!(
            store.get("acme/state").await.unwrap(),
            Some(b"Imp_PO_Draft".to_vec())
        );
        assert_eq!(store.get("../escape?").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(store.get("missing-key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_kilobyte_key_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        let long_key = "k".repeat(1024);
        let near_twin = format!("{}x", "k".repeat(1023));

        store.put(&long_key, b"manifest").await.unwrap();
        store.put(&near_twin, b"other").await.unwrap();

        assert_eq!(store.get(&long_key).await.unwrap(), Some(b"manifest".to_vec()));
        assert_eq!(store.get(&near_twin).await.unwrap(), Some(b"other".to_vec()));
        assert_eq!(store.get(&"k".repeat(1025)).await.unwrap(), None);

        let path = store.path_for(&long_key);
        for component in path.strip_prefix(dir.path()).unwrap().components() {
            assert!(component.as_os_str().len() <= SEGMENT_LEN + 4);
        }
    }

    #[tokio::test]
    async fn test_empty_key_is_storable() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        store.put("", b"blank").await.unwrap();
        assert_eq!(store.get("").await.unwrap(), Some(b"blank".to_vec()));
    }

    #[tokio::test]
    async fn test_overwrite_and_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileStore::open(dir.path()).await.unwrap();
            store.put("k", b"one").await.unwrap();
            store.put("k", b"two").await.unwrap();
        }
        let reopened = FileStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get("k").await.unwrap(), Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn test_open_creates_nested_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileStore::open(&nested).await.unwrap();
        assert!(store.root().is_dir());
    }
}
