use super::{KvStore, StorageError};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// JSON collections on top of a [`KvStore`], one array per key.
///
/// Every mutation of a key runs read-modify-write while holding that key's
/// lock, so two writers on the same collection are applied one after the
/// other instead of the second overwriting the first. Plain reads take no
/// lock.
pub struct BlobStore {
    kv: Arc<dyn KvStore>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl BlobStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.kv.backend_name()
    }

    async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>, StorageError> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| {
                warn!("Malformed collection under {}: {}", key, source);
                StorageError::Corrupt {
                    key: key.to_string(),
                    source,
                }
            })
    }

    async fn write<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StorageError> {
        let json = serde_json::to_string(items).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.kv.set(key, json).await
    }

    /// Whole collection under `key`; a key that was never written is empty.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StorageError> {
        Ok(self.read(key).await?.unwrap_or_default())
    }

    /// Apply `f` to the stored collection and write it back.
    ///
    /// `f` returning `None` means nothing changed: storage is left untouched
    /// and `None` is returned. `f` sees an empty collection when the key is
    /// absent; `present` tells it whether that emptiness is real.
    pub async fn modify<T, R, F>(&self, key: &str, f: F) -> Result<Option<R>, StorageError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>, bool) -> Option<R>,
    {
        let lock = self.key_lock(key).await;
        let _guard = lock.lock().await;

        let stored = self.read::<T>(key).await?;
        let present = stored.is_some();
        let mut items = stored.unwrap_or_default();

        let Some(result) = f(&mut items, present) else {
            debug!("No changes for {}", key);
            return Ok(None);
        };

        self.write(key, &items).await?;
        debug!("Persisted {} records under {}", items.len(), key);
        Ok(Some(result))
    }

    /// Like [`BlobStore::modify`] for mutations that always write.
    pub async fn update<T, R, F>(&self, key: &str, f: F) -> Result<R, StorageError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let lock = self.key_lock(key).await;
        let _guard = lock.lock().await;

        let mut items = self.load::<T>(key).await?;
        let result = f(&mut items);

        self.write(key, &items).await?;
        debug!("Persisted {} records under {}", items.len(), key);
        Ok(result)
    }

    /// Drop the collection under `key`. Waits for in-flight writers.
    pub async fn clear(&self, key: &str) -> Result<bool, StorageError> {
        let lock = self.key_lock(key).await;
        let _guard = lock.lock().await;
        self.kv.remove(key).await
    }
}
