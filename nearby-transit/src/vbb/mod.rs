//! Client for the VBB `transport.rest` API.
//!
//! Key characteristics of the API:
//! - nearby lookups return a bare JSON array of locations
//! - departures come back either as a bare array or wrapped in
//!   `{"departures": [...]}` depending on the API version
//! - records omit fields freely, so everything is validated row by row

mod client;
mod convert;
mod error;
mod mock;
mod types;

pub use client::{DeparturesQuery, NearbyQuery, TransitApi, VbbClient, VbbConfig};
pub use convert::{
    convert_departure, convert_departures, convert_nearby, departure_rows, is_valid_station,
    normalize_station,
};
pub use error::ApiError;
pub use mock::{MockTransitApi, Release};
pub use types::{RawDeparture, RawGeoLocation, RawLine, RawLocation};
