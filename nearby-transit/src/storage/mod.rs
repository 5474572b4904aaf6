//! Local key-value storage for preferences and favourites.
//!
//! Values are JSON strings keyed by short names such as `user-preferences`.
//! [`FileStore`] keeps one file per key on disk; [`MemoryStore`] is for
//! tests and ephemeral sessions.

mod error;
mod file;
mod memory;

pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` if the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and deserialize a JSON value.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StorageError::Json {
            key: key.to_string(),
            message: e.to_string(),
        })
}

/// Serialize and write a JSON value.
pub fn save_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value).map_err(|e| StorageError::Json {
        key: key.to_string(),
        message: e.to_string(),
    })?;

    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip_through_store() {
        let store = MemoryStore::new();
        save_json(&store, "ids", &vec!["a", "b"]).unwrap();

        let loaded: Option<Vec<String>> = load_json(&store, "ids").unwrap();
        assert_eq!(loaded, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn missing_key_is_none() {
        let store = MemoryStore::new();
        let loaded: Option<Vec<String>> = load_json(&store, "nothing").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn malformed_json_is_error() {
        let store = MemoryStore::new();
        store.set("ids", "{not json").unwrap();

        let err = load_json::<Vec<String>>(&store, "ids").unwrap_err();
        assert!(matches!(err, StorageError::Json { ref key, .. } if key == "ids"));
    }
}
