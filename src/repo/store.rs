//! Key-value persistence for serialized record collections.
//!
//! The services only ever load or save a whole collection under one key.
//! There is no locking between a load and the following save, so two
//! overlapping mutations of the same collection can lose an update.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StorageError;

/// Opaque get/set-by-key store holding serialized payloads
pub trait KeyValueStore: Send + Sync {
    /// Payload stored under `key`, or `None` if nothing was ever saved
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Replace the payload stored under `key`
    fn save(&self, key: &str, payload: String) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Drop the payload stored under `key`; missing keys are not an error
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Process-local store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, payload: String) -> Result<(), StorageError> {
        self.entries.write().await.insert(key.to_string(), payload);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Store keeping one JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root_dir: PathBuf,
}

impl FileStore {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root_dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn save(&self, key: &str, payload: String) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root_dir).await?;

        // Write aside and rename so readers never observe a half-written file
        let tmp_path = path.with_extension("json.tmp");
        let written = match tokio::fs::write(&tmp_path, payload).await {
            Ok(()) => tokio::fs::rename(&tmp_path, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            // Don't leave a stray temp file next to the collection
            let _ = tokio::fs::remove_file(&tmp_path).await;
            debug!(key = %key, error = %e, "Collection write failed");
            return Err(StorageError::Io(e));
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

/// Store chosen at startup from configuration
#[derive(Debug, Clone)]
pub enum StoreBackend {
    Memory(InMemoryStore),
    File(FileStore),
}

impl KeyValueStore for StoreBackend {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            StoreBackend::Memory(store) => store.load(key).await,
            StoreBackend::File(store) => store.load(key).await,
        }
    }

    async fn save(&self, key: &str, payload: String) -> Result<(), StorageError> {
        match self {
            StoreBackend::Memory(store) => store.save(key, payload).await,
            StoreBackend::File(store) => store.save(key, payload).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self {
            StoreBackend::Memory(store) => store.remove(key).await,
            StoreBackend::File(store) => store.remove(key).await,
        }
    }
}

/// Typed view of one collection key: a JSON array of records
#[derive(Debug)]
pub struct Collection<'a, S, T> {
    store: &'a S,
    key: &'a str,
    _record: PhantomData<fn() -> T>,
}

impl<'a, S, T> Collection<'a, S, T>
where
    S: KeyValueStore,
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: &'a S, key: &'a str) -> Self {
        Self {
            store,
            key,
            _record: PhantomData,
        }
    }

    /// Every record under the key; an absent key is an empty collection
    pub async fn load_all(&self) -> Result<Vec<T>, StorageError> {
        let Some(payload) = self.store.load(self.key).await? else {
            debug!(key = %self.key, "Collection not found, treating as empty");
            return Ok(Vec::new());
        };

        let records: Vec<T> =
            serde_json::from_str(&payload).map_err(|e| StorageError::Corrupt {
                key: self.key.to_string(),
                message: e.to_string(),
            })?;
        debug!(key = %self.key, count = records.len(), "Collection loaded");
        Ok(records)
    }

    /// Replace the whole collection
    pub async fn save_all(&self, records: &[T]) -> Result<(), StorageError> {
        let payload = serde_json::to_string(records)?;
        self.store.save(self.key, payload).await?;
        debug!(key = %self.key, count = records.len(), "Collection saved");
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(self.key).await
    }
}
