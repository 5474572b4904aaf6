//! Nearby-station and departure synchronisation.
//!
//! [`StationsStore`] owns the station list, per-station departures, the
//! departure cache and the in-flight request bookkeeping. Readers observe it
//! through accessor snapshots or the [`StoreEvent`] channel.

mod cache;
mod config;
mod events;
mod inflight;
mod merge;
mod rank;
mod store;


pub use cache::{CachedDepartures, DepartureCache};
pub use config::SyncConfig;
pub use events::StoreEvent;
pub use merge::merge_departures;
pub use rank::rank_stations;
pub use store::{DepartureMode, INVALID_COORDINATES, StationsStore};
