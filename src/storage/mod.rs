//! Key-value persistence.
//!
//! Repositories talk to a [`Storage`] handle; the actual medium lives
//! behind the [`StorageBackend`] trait so the app ships the file backend
//! while tests swap in the in-memory one.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Prepares the backend for use. Idempotent; must complete before any
    /// read or write.
    async fn init(&self) -> Result<()>;

    async fn read(&self, key: &str) -> Result<Option<Value>>;

    async fn write(&self, key: &str, value: Value) -> Result<()>;
}

/// Cloneable handle shared by every repository.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub async fn init(&self) -> Result<()> {
        self.backend.init().await
    }

    /// Reads and deserializes the value at `key`. An absent key or a stored
    /// value of the wrong shape yields `fallback`; only backend I/O failure
    /// is an error.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> Result<T> {
        let stored = self.backend.read(key).await?;
        Ok(stored
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or(fallback))
    }

    /// Persists `value` at `key`, overwriting any prior value.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.backend.write(key, serde_json::to_value(value)?).await
    }
}
