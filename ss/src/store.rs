//! SharedStore trait definition

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::StoreError;

/// A passive key-value store with last-write-wins semantics per key
///
/// Reads of a key that was never written (or was cleared) return the empty
/// string. Implementations give no ordering guarantee across keys and no
/// guarantee that a read observes a concurrent writer's most recent value.
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// Read a key, returning "" when it is absent
    async fn get(&self, key: &str) -> Result<String, StoreError>;

    /// Write a key
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove every key
    async fn clear(&self) -> Result<(), StoreError>;

    /// Dump every key for diagnostics
    async fn snapshot(&self) -> Result<BTreeMap<String, String>, StoreError> {
        Err(StoreError::Unsupported("snapshot"))
    }
}

/// Check that a key is usable by every backend
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
