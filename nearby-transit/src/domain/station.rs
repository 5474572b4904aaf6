//! Normalised station type.

use super::coordinate::Coordinate;
use super::transit_type::{TransitType, normalize_transit_type};

/// Geographic location as reported by the API.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// API location tag, usually `"location"`.
    pub kind: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// A nearby station.
///
/// `distance` is only ever filled in by ranking relative to a reference
/// point; stations coming straight from the API have `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub name: String,
    /// API type tag (e.g. `"stop"` or `"station"`).
    pub kind: String,
    pub location: Location,
    /// Distance from the reference point in metres.
    pub distance: Option<f64>,
}

impl Station {
    /// Transit type derived from the station's type tag.
    pub fn transit_type(&self) -> TransitType {
        normalize_transit_type(&self.kind)
    }

    /// Returns a copy with `distance` set relative to `origin`.
    pub fn with_distance_from(&self, origin: &Coordinate) -> Station {
        Station {
            distance: Some(origin.distance_to(&self.location.coordinate())),
            ..self.clone()
        }
    }
}
