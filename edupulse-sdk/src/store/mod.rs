//! Persisted client-side state
//!
//! The client keeps a handful of small values between runs: the
//! offline-fallback counter and flag, the saved teacher notes, and the API
//! base URL override. They live behind the [`KeyValueStore`] trait so the
//! state machine can be exercised against [`MemoryStore`] in tests and
//! against [`JsonFileStore`] in real use.

mod notes;
mod preferences;

pub use notes::{NoteBook, TeacherNote, NOTES_KEY};
pub use preferences::{Preferences, API_URL_KEY};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};

use crate::error::{Result, ServiceError};

/// Shared handle to a store
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Asynchronous key-value persistence for client state
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a raw value, `None` when the key was never written
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write a raw value
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove a key; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Typed helpers over any [`KeyValueStore`]
#[async_trait]
pub trait KeyValueStoreExt: KeyValueStore {
    /// Read and deserialize a value
    async fn get_typed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                ServiceError::storage(format!("Stored value for {} is malformed: {}", key, e))
            }),
            None => Ok(None),
        }
    }

    /// Serialize and write a value
    async fn set_typed<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let value = serde_json::to_value(value)?;
        self.set(key, value).await
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

/// In-memory store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with values
    pub fn with_values(values: HashMap<String, Value>) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    /// Wrap into a shared handle
    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file
///
/// Every write rewrites the whole file through a sibling `.json.tmp` file
/// that is renamed over the original.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store at an explicit path; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create a store at the platform data directory
    /// (`<data_dir>/edupulse/state.json`)
    pub fn in_data_dir() -> Result<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| ServiceError::storage("No data directory available on this platform"))?;
        Ok(Self::new(dir.join("edupulse").join("state.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Map<String, Value>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(ServiceError::storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ServiceError::storage(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(ServiceError::storage(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(map)?;

        // Readers only ever see a complete file
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, content).await.map_err(|e| {
            ServiceError::storage(format!("Failed to write {}: {}", temp_path.display(), e))
        })?;
        tokio::fs::rename(&temp_path, &self.path).await.map_err(|e| {
            ServiceError::storage(format!("Failed to replace {}: {}", self.path.display(), e))
        })
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        map.insert(key.to_string(), value);
        self.save(&map).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        if map.remove(key).is_some() {
            self.save(&map).await?;
        }
        Ok(())
    }
}
