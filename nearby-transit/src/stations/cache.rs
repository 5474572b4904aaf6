//! Short-lived cache of departure lists.
//!
//! Only the "base" departure view (a plain or forced fetch) is cached.
//! Entries expire after the configured TTL, after which the next plain
//! fetch goes to the network again.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use moka::sync::Cache as MokaCache;

use crate::domain::Trip;

use super::config::SyncConfig;

/// A cached departure list and when it was fetched.
#[derive(Debug, Clone)]
pub struct CachedDepartures {
    pub trips: Vec<Trip>,
    pub fetched_at: DateTime<Utc>,
}

/// Departure lists keyed by station id.
pub struct DepartureCache {
    entries: MokaCache<String, Arc<CachedDepartures>>,
}

impl DepartureCache {
    pub fn new(config: &SyncConfig) -> Self {
        let entries = MokaCache::builder()
            .time_to_live(config.cache_ttl)
            .max_capacity(config.cache_capacity)
            .build();

        Self { entries }
    }

    /// Fresh entry for a station, if any.
    pub fn get(&self, station_id: &str) -> Option<Arc<CachedDepartures>> {
        self.entries.get(station_id)
    }

    /// Store a station's departures, stamped with the current time.
    pub fn insert(&self, station_id: &str, trips: Vec<Trip>) {
        let entry = CachedDepartures {
            trips,
            fetched_at: Utc::now(),
        };
        self.entries.insert(station_id.to_string(), Arc::new(entry));
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }
}
