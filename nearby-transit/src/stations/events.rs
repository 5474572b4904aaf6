//! Change notifications for observers of the stations store.

use crate::domain::Coordinate;

/// Emitted on the store's broadcast channel after each state change.
///
/// Events carry just enough to decide what to re-read; the store itself is
/// the source of truth.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// The station list was replaced.
    StationsChanged,

    /// One station's departure list was replaced or extended.
    DeparturesChanged { station_id: String },

    /// The nearby-stations loading flag changed.
    LoadingChanged(bool),

    /// The error field changed.
    ErrorChanged(Option<String>),

    /// The manual map centre moved. Ranked stations should be re-read.
    MapCenterChanged(Coordinate),

    /// Everything was reset by `clear_stations`.
    Cleared,
}
