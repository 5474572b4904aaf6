//! User preference record.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::TransitType;

/// Lower bound applied to the stored refresh interval.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Which stations the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    All,
    Favorites,
}

/// User-tunable parameters.
///
/// Persisted as a camelCase JSON object. Unknown keys are ignored when
/// loading and missing keys take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    /// Recentre the map when the user location changes.
    pub allow_auto_center: bool,

    pub dark_mode: bool,

    /// Departure refresh interval in milliseconds.
    pub refresh_interval: u64,

    /// Maximum number of stations fetched and ranked.
    pub max_stations: usize,

    /// Maximum number of departures per station.
    pub max_departures: usize,

    /// Nearby search radius in metres.
    pub max_distance: u32,

    pub last_view: View,

    /// Transit types shown in the favourites view.
    pub enabled_transit_types: BTreeSet<TransitType>,
}

impl UserPreferences {
    /// Refresh interval as a Duration, never shorter than one second.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval).max(MIN_REFRESH_INTERVAL)
    }

    pub fn is_enabled(&self, transit_type: TransitType) -> bool {
        self.enabled_transit_types.contains(&transit_type)
    }

    /// Apply a single-field update.
    pub fn apply(&mut self, update: Preference) {
        match update {
            Preference::AllowAutoCenter(v) => self.allow_auto_center = v,
            Preference::DarkMode(v) => self.dark_mode = v,
            Preference::RefreshInterval(v) => self.refresh_interval = v,
            Preference::MaxStations(v) => self.max_stations = v,
            Preference::MaxDepartures(v) => self.max_departures = v,
            Preference::MaxDistance(v) => self.max_distance = v,
            Preference::LastView(v) => self.last_view = v,
            Preference::EnabledTransitTypes(v) => self.enabled_transit_types = v,
        }
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            allow_auto_center: true,
            dark_mode: false,
            refresh_interval: 60_000, // 1 minute
            max_stations: 6,
            max_departures: 6,
            max_distance: 1000, // metres
            last_view: View::All,
            enabled_transit_types: [
                TransitType::Sbahn,
                TransitType::Ubahn,
                TransitType::Tram,
                TransitType::Bus,
                TransitType::Ferry,
            ]
            .into_iter()
            .collect(),
        }
    }
}

/// A named update to exactly one preference field.
#[derive(Debug, Clone, PartialEq)]
pub enum Preference {
    AllowAutoCenter(bool),
    DarkMode(bool),
    /// Milliseconds.
    RefreshInterval(u64),
    MaxStations(usize),
    MaxDepartures(usize),
    /// Metres.
    MaxDistance(u32),
    LastView(View),
    EnabledTransitTypes(BTreeSet<TransitType>),
}
