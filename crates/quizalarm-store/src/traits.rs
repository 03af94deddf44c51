//! Store trait definitions

use serde_json::Value;

use crate::StoreResult;

/// Persistent key-value capability
///
/// Values are JSON documents. Every write is durable once `set` returns.
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`
    fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &Value) -> StoreResult<()>;

    /// Whether `key` has a value
    fn has(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Remove `key`. Returns whether it existed.
    fn remove(&self, key: &str) -> StoreResult<bool>;

    /// All stored keys, sorted
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
