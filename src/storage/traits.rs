use super::StorageError;
use async_trait::async_trait;

/// Persistent string store addressed by fixed keys.
/// Implementations only move raw values; encoding lives in [`super::BlobStore`].
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Value stored under `key`, or `None` if nothing was ever written
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace whatever is stored under `key`
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Drop `key`. Returns whether anything was removed.
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;

    fn backend_name(&self) -> &'static str;
}
