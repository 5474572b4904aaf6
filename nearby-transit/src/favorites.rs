//! Favourite stations and the active view.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

use crate::preferences::{Preference, PreferencesStore, View};
use crate::storage::{self, KeyValueStore, StorageError};

/// Storage key for the favourite station ids.
pub const FAVORITES_KEY: &str = "favorite-stations";

/// Ordered set of favourite station ids.
///
/// The active view is not stored here: it is the `last_view` preference, so
/// there is a single source of truth.
pub struct FavoritesStore {
    storage: Arc<dyn KeyValueStore>,
    preferences: Arc<PreferencesStore>,
    ids: RwLock<Vec<String>>,
}

impl FavoritesStore {
    /// Load favourites from storage. Unreadable data is logged and ignored.
    pub fn load(storage: Arc<dyn KeyValueStore>, preferences: Arc<PreferencesStore>) -> Self {
        let ids = match storage::load_json::<Vec<String>>(storage.as_ref(), FAVORITES_KEY) {
            Ok(Some(ids)) => dedup_preserving_order(ids),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("ignoring stored favourites: {e}");
                Vec::new()
            }
        };

        Self {
            storage,
            preferences,
            ids: RwLock::new(ids),
        }
    }

    /// Favourite ids in insertion order.
    pub fn favorite_ids(&self) -> Vec<String> {
        self.ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_favorite(&self, station_id: &str) -> bool {
        self.ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|id| id == station_id)
    }

    /// Add the id if absent, remove it if present. Persists the new list.
    ///
    /// Returns whether the station is a favourite afterwards.
    pub fn toggle_favorite(&self, station_id: &str) -> Result<bool, StorageError> {
        let (now_favorite, snapshot) = {
            let mut ids = self.ids.write().unwrap_or_else(PoisonError::into_inner);
            let now_favorite = match ids.iter().position(|id| id == station_id) {
                Some(index) => {
                    ids.remove(index);
                    false
                }
                None => {
                    ids.push(station_id.to_string());
                    true
                }
            };
            (now_favorite, ids.clone())
        };

        storage::save_json(self.storage.as_ref(), FAVORITES_KEY, &snapshot)?;
        Ok(now_favorite)
    }

    /// The current view, read from preferences.
    pub fn active_view(&self) -> View {
        self.preferences.preferences().last_view
    }

    /// Set the current view by writing the `last_view` preference.
    pub fn set_active_view(&self, view: View) -> Result<(), StorageError> {
        self.preferences.update(Preference::LastView(view))
    }
}

fn dedup_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
