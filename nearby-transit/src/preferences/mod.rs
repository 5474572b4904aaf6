//! User preferences, persisted to the local key-value store.

mod types;

pub use types::{Preference, UserPreferences, View};

use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

use crate::storage::{self, KeyValueStore, StorageError};

/// Storage key for the preference record.
pub const PREFERENCES_KEY: &str = "user-preferences";

/// Holds the current preferences and writes every change through to storage.
pub struct PreferencesStore {
    storage: Arc<dyn KeyValueStore>,
    current: RwLock<UserPreferences>,
}

impl PreferencesStore {
    /// Load preferences from storage.
    ///
    /// A missing record gives the defaults. An unreadable or malformed one
    /// is logged and also gives the defaults; it is overwritten on the next
    /// update.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let current = match storage::load_json::<UserPreferences>(storage.as_ref(), PREFERENCES_KEY)
        {
            Ok(Some(prefs)) => prefs,
            Ok(None) => UserPreferences::default(),
            Err(e) => {
                warn!("ignoring stored preferences: {e}");
                UserPreferences::default()
            }
        };

        Self {
            storage,
            current: RwLock::new(current),
        }
    }

    /// Snapshot of the current preferences.
    pub fn preferences(&self) -> UserPreferences {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace exactly one field and persist.
    ///
    /// The in-memory value changes even if persisting fails.
    pub fn update(&self, update: Preference) -> Result<(), StorageError> {
        let snapshot = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            current.apply(update);
            current.clone()
        };

        self.persist(&snapshot)
    }

    /// Restore every field to its default and persist.
    pub fn reset(&self) -> Result<(), StorageError> {
        let defaults = UserPreferences::default();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = defaults.clone();

        self.persist(&defaults)
    }

    fn persist(&self, prefs: &UserPreferences) -> Result<(), StorageError> {
        storage::save_json(self.storage.as_ref(), PREFERENCES_KEY, prefs)
    }
}
