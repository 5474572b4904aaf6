//! Tuning constants for station/departure synchronisation.

use std::time::Duration;

/// Configuration for [`super::StationsStore`].
///
/// User-facing limits (max stations, max departures, radius) live in
/// [`crate::preferences::UserPreferences`]; these are the fixed knobs.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How long a fetched departure list may be served from cache.
    pub cache_ttl: Duration,

    /// Maximum number of stations with cached departures.
    pub cache_capacity: u64,

    /// Look-ahead window for departure requests (minutes).
    pub departure_window_mins: u32,

    /// A "load more" request asks for this many times the configured
    /// maximum number of departures.
    pub load_more_request_factor: usize,

    /// A merged "load more" list is capped at this many times the
    /// configured maximum.
    pub load_more_cap_factor: usize,

    /// Buffer size of the event channel; slow subscribers see `Lagged`.
    pub event_capacity: usize,
}

impl SyncConfig {
    /// Set the departure cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the departure look-ahead window.
    pub fn with_departure_window(mut self, mins: u32) -> Self {
        self.departure_window_mins = mins;
        self
    }

    /// Set the event channel buffer size.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(30),
            cache_capacity: 256,
            departure_window_mins: 30,
            load_more_request_factor: 3,
            load_more_cap_factor: 2,
            event_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SyncConfig::default();

        assert_eq!(config.cache_ttl, Duration::from_secs(30));
        assert_eq!(config.cache_capacity, 256);
        assert_eq!(config.departure_window_mins, 30);
        assert_eq!(config.load_more_request_factor, 3);
        assert_eq!(config.load_more_cap_factor, 2);
        assert_eq!(config.event_capacity, 64);
    }

    #[test]
    fn builder() {
        let config = SyncConfig::default()
            .with_cache_ttl(Duration::from_millis(50))
            .with_departure_window(60)
            .with_event_capacity(8);

        assert_eq!(config.cache_ttl, Duration::from_millis(50));
        assert_eq!(config.departure_window_mins, 60);
        assert_eq!(config.event_capacity, 8);
    }
}
