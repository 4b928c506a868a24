//! In-memory key-value store

use crate::host::KvStore;
use crate::Result;
use dashmap::DashMap;

/// Volatile [`KvStore`], lost on drop
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: DashMap<(String, String), serde_json::Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, owner: &str, key: &str) -> Option<serde_json::Value> {
        self.values
            .get(&(owner.to_string(), key.to_string()))
            .map(|v| v.value().clone())
    }

    fn set(&self, owner: &str, key: &str, value: serde_json::Value) -> Result<()> {
        self.values.insert((owner.to_string(), key.to_string()), value);
        Ok(())
    }
}
