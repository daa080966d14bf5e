use std::{
    collections::HashMap,
    sync::Mutex,
};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::StorageBackend;

/// In-memory backend for tests. Tracks write counts per key so coalescing
/// behavior (debounced saves) is observable from assertions.
#[derive(Default)]
pub struct MemoryBackend {
    data: Mutex<HashMap<String, Value>>,
    write_counts: Mutex<HashMap<String, usize>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self, key: &str) -> usize {
        self.write_counts
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    async fn write(&self, key: &str, value: Value) -> Result<()> {
        self.data.lock().unwrap().insert(key.to_string(), value);
        *self
            .write_counts
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_insert(0) += 1;
        Ok(())
    }
}
