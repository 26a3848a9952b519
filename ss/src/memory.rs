//! In-process store backed by a shared HashMap

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::{SharedStore, StoreError, validate_key};

/// In-memory store; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds valid strings
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<String, StoreError> {
        validate_key(key)?;
        Ok(self.map().get(key).cloned().unwrap_or_default())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        debug!(key, value, "MemoryStore::set");
        self.map().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        debug!("MemoryStore::clear");
        self.map().clear();
        Ok(())
    }

    async fn snapshot(&self) -> Result<BTreeMap<String, String>, StoreError> {
        Ok(self.map().iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}
