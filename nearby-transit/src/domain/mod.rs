//! Domain types for nearby stations and their departures.
//!
//! Everything here is already normalised: raw API shapes live in
//! [`crate::vbb`] and are converted before reaching these types.

mod coordinate;
mod station;
mod transit_type;
mod trip;

pub use coordinate::{Coordinate, EARTH_RADIUS_M, distance, is_valid_coordinate};
pub use station::{Location, Station};
pub use transit_type::{TransitType, normalize_transit_type};
pub use trip::{Line, Trip};
