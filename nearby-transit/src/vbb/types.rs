//! Raw transit API records.
//!
//! These map directly to the `transport.rest` JSON shapes. Every field is
//! optional because the API omits rather than nulls, and because invalid
//! rows are filtered out during conversion instead of failing the whole
//! response.

use serde::Deserialize;
use serde_json::Value;

/// A record from `GET /locations/nearby`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLocation {
    /// Record type, e.g. `"stop"`.
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub id: Option<String>,

    /// Display name, often with a city suffix like `" (Berlin)"`.
    pub name: Option<String>,

    pub location: Option<RawGeoLocation>,
}

/// Nested location of a [`RawLocation`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGeoLocation {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A record from `GET /stops/{id}/departures`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDeparture {
    pub trip_id: Option<String>,

    pub line: Option<RawLine>,

    pub direction: Option<String>,

    /// Actual/estimated departure time (ISO 8601 with offset).
    pub when: Option<String>,

    /// Scheduled departure time (ISO 8601 with offset).
    pub planned_when: Option<String>,

    /// Usually a bool, but tolerated as any JSON value.
    pub cancelled: Option<Value>,

    /// Usually a string, sometimes a number.
    pub platform: Option<Value>,
}

/// Line descriptor of a [`RawDeparture`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLine {
    pub name: Option<String>,
    pub product: Option<String>,
    pub mode: Option<String>,
}
