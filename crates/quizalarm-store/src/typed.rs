//! Typed access on top of [`KeyValueStore`]

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::{KeyValueStore, StoreResult};

/// Load and deserialize `key`. A value of the wrong shape is an error.
pub fn load_typed<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StoreResult<Option<T>> {
    match store.get(key)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Load `key`, falling back to `default` when it is absent, corrupt, or the
/// store cannot be read. Never fails.
pub fn load_or_else<T, F>(store: &dyn KeyValueStore, key: &str, default: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match load_typed(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => default(),
        Err(e) => {
            warn!(key, error = %e, "Stored value unreadable, using default");
            default()
        }
    }
}

/// Serialize and store `value` under `key`
pub fn save_typed<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> StoreResult<()> {
    let json = serde_json::to_value(value)?;
    store.set(key, &json)
}

/// Store `value` only if `key` has no value yet. Returns whether it wrote.
pub fn save_if_absent<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> StoreResult<bool> {
    if store.has(key)? {
        return Ok(false);
    }
    save_typed(store, key, value)?;
    Ok(true)
}
