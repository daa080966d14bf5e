use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::{fs, sync::Mutex};

use super::StorageBackend;

/// Stores every key in a single JSON document on disk.
///
/// Reads tolerate a missing or corrupt file (treated as empty); writes go
/// through a read-modify-write cycle serialized by a lock so concurrent
/// save timers cannot clobber each other's keys.
pub struct FileBackend {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileBackend {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    async fn load_document(&self) -> Map<String, Value> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => match serde_json::from_str::<Value>(&contents) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            },
            Err(_) => Map::new(),
        }
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn init(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("failed to create storage directory {}", parent.display())
            })?;
        }
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.load_document().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.load_document().await;
        document.insert(key.to_string(), value);

        let serialized = serde_json::to_string_pretty(&Value::Object(document))?;
        fs::write(&self.path, serialized)
            .await
            .with_context(|| format!("failed to write storage file {}", self.path.display()))
    }
}
