use super::{KvStore, StorageError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// One JSON file per key under a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// File for `key`. Path separators, `:` and `%` are percent-encoded, so
    /// distinct keys never share a file and none can leave `base_path`.
    fn key_to_path(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for c in key.chars() {
            match c {
                '%' => name.push_str("%25"),
                '/' => name.push_str("%2F"),
                '\\' => name.push_str("%5C"),
                ':' => name.push_str("%3A"),
                c => name.push(c),
            }
        }
        self.base_path.join(format!("{}.json", name))
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_to_path(key);
        match fs::read_to_string(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                key: key.to_string(),
                message: format!("I/O error on {}: {}", path.display(), e),
            }),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let write_failed = |e: std::io::Error| StorageError::WriteFailed {
            key: key.to_string(),
            message: format!("I/O error: {}", e),
        };

        fs::create_dir_all(&self.base_path).await.map_err(write_failed)?;

        // Write beside the target and rename so readers never see half a file.
        let path = self.key_to_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value.as_bytes()).await.map_err(write_failed)?;
        fs::rename(&tmp, &path).await.map_err(write_failed)?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        match fs::remove_file(self.key_to_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed {
                key: key.to_string(),
                message: format!("I/O error: {}", e),
            }),
        }
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data"));

        assert_eq!(store.get("user_properties").await.unwrap(), None);
        assert!(!store.remove("user_properties").await.unwrap());
    }

    #[tokio::test]
    async fn set_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("data"));

        store.set("user_bookings", "[]".to_string()).await.unwrap();
        store.set("user_bookings", "[1]".to_string()).await.unwrap();

        assert_eq!(store.get("user_bookings").await.unwrap().as_deref(), Some("[1]"));
        assert!(store.base_path().join("user_bookings.json").exists());
        assert!(!store.base_path().join("user_bookings.json.tmp").exists());
    }

    #[tokio::test]
    async fn keys_cannot_escape_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.set("user_favorites_a/b", "[]".to_string()).await.unwrap();
        assert!(dir.path().join("user_favorites_a%2Fb.json").exists());
        assert!(store.remove("user_favorites_a/b").await.unwrap());

        store.set("../escape", "[]".to_string()).await.unwrap();
        assert!(dir.path().join("..%2Fescape.json").exists());
    }

    #[tokio::test]
    async fn similar_keys_get_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let keys = [
            "user_favorites_a/b",
            "user_favorites_a_b",
            "user_favorites_a%2Fb",
            "user_favorites_a:b",
            "user_favorites_a\\b",
        ];

        for (i, key) in keys.iter().enumerate() {
            store.set(key, format!("[{}]", i)).await.unwrap();
        }
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(store.get(key).await.unwrap(), Some(format!("[{}]", i)));
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), keys.len());
    }
}
