//! Persistent per-module key-value storage using sled
//!
//! Keys are `owner \0 key`, values are JSON bytes. Every write is flushed.

use dk_core::{HostError, KvStore};
use sled::Db;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

const SEPARATOR: u8 = 0;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sled::Error),

    #[error("invalid value: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StoreError> for HostError {
    fn from(e: StoreError) -> Self {
        HostError::Store(e.to_string())
    }
}

/// sled-backed [`KvStore`]
pub struct SledStore {
    db: Db,
}

impl SledStore {
    /// Open or create a store in the given directory
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = sled::open(path.join("kv.db"))?;
        Ok(Self { db })
    }

    fn key(owner: &str, key: &str) -> Vec<u8> {
        let mut k = Vec::with_capacity(owner.len() + key.len() + 1);
        k.extend_from_slice(owner.as_bytes());
        k.push(SEPARATOR);
        k.extend_from_slice(key.as_bytes());
        k
    }

    /// Read a raw value, surfacing database errors
    pub fn try_get(&self, owner: &str, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        match self.db.get(Self::key(owner, key))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Write a value and flush it to disk
    pub fn try_set(&self, owner: &str, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value)?;
        self.db.insert(Self::key(owner, key), bytes)?;
        self.db.flush()?;
        Ok(())
    }
}

impl KvStore for SledStore {
    fn get(&self, owner: &str, key: &str) -> Option<serde_json::Value> {
        match self.try_get(owner, key) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to read {}/{}: {}", owner, key, e);
                None
            }
        }
    }

    fn set(&self, owner: &str, key: &str, value: serde_json::Value) -> dk_core::Result<()> {
        self.try_set(owner, key, &value)?;
        Ok(())
    }
}
