//! Conversion from raw API records to domain types.
//!
//! Rows that fail validation are dropped with a debug log rather than
//! failing the whole response: one malformed stop should not hide the rest.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::debug;

use crate::domain::{Line, Location, Station, Trip, normalize_transit_type};

use super::error::ApiError;
use super::types::{RawDeparture, RawLocation};

/// Suffix the VBB API appends to stop names inside the city.
const CITY_SUFFIX: &str = " (Berlin)";

/// Product assumed when a line has neither `product` nor `mode`.
const DEFAULT_PRODUCT: &str = "bus";

/// Returns true if the record has a non-empty name and numeric coordinates.
pub fn is_valid_station(raw: &RawLocation) -> bool {
    let has_name = raw.name.as_deref().is_some_and(|n| !n.is_empty());
    let has_coords = raw
        .location
        .as_ref()
        .is_some_and(|l| l.latitude.is_some() && l.longitude.is_some());

    has_name && has_coords
}

/// Normalise a raw location into a [`Station`].
///
/// Strips the `" (Berlin)"` suffix and surrounding whitespace from the name;
/// id, type and location are copied verbatim. Distance is always `None`.
/// Returns `None` for records [`is_valid_station`] rejects.
pub fn normalize_station(raw: &RawLocation) -> Option<Station> {
    if !is_valid_station(raw) {
        return None;
    }

    let name = raw.name.as_deref()?;
    let geo = raw.location.as_ref()?;

    Some(Station {
        id: raw.id.clone().unwrap_or_default(),
        name: name.replacen(CITY_SUFFIX, "", 1).trim().to_string(),
        kind: raw.kind.clone().unwrap_or_default(),
        location: Location {
            kind: geo.kind.clone().unwrap_or_default(),
            latitude: geo.latitude?,
            longitude: geo.longitude?,
        },
        distance: None,
    })
}

/// Convert a nearby-locations payload into at most `max` stations.
///
/// The payload must be a JSON array; anything else is
/// [`ApiError::InvalidFormat`]. Elements that are not valid stations are
/// skipped.
pub fn convert_nearby(payload: Value, max: usize) -> Result<Vec<Station>, ApiError> {
    let Value::Array(items) = payload else {
        return Err(ApiError::InvalidFormat);
    };

    let stations = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawLocation>(item) {
            Ok(raw) => Some(raw),
            Err(e) => {
                debug!("skipping malformed location: {e}");
                None
            }
        })
        .filter_map(|raw| normalize_station(&raw))
        .take(max)
        .collect();

    Ok(stations)
}

/// Extract the departure rows from either a bare array or `{"departures": [...]}`.
///
/// Any other shape yields no rows.
pub fn departure_rows(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("departures") {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Convert one raw departure into a [`Trip`].
///
/// Returns `None` if the line name or direction is missing, or if neither
/// time is present. A missing time is filled from the other one.
pub fn convert_departure(raw: &RawDeparture) -> Option<Trip> {
    let line = raw.line.as_ref()?;
    let line_name = line.name.as_deref().filter(|n| !n.is_empty())?;
    let direction = raw.direction.as_deref().filter(|d| !d.is_empty())?;

    let planned = raw.planned_when.as_deref().and_then(parse_time);
    let actual = raw.when.as_deref().and_then(parse_time);
    let (planned_when, when) = match (planned, actual) {
        (Some(p), Some(a)) => (p, a),
        (Some(p), None) => (p, p),
        (None, Some(a)) => (a, a),
        (None, None) => return None,
    };

    let product = line
        .product
        .as_deref()
        .or(line.mode.as_deref())
        .unwrap_or(DEFAULT_PRODUCT);

    let trip_id = match raw.trip_id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => synthesize_trip_id(planned_when, line_name),
    };

    Some(Trip {
        trip_id,
        line: Line {
            name: line_name.to_string(),
            product: normalize_transit_type(product),
        },
        direction: direction.to_string(),
        when,
        planned_when,
        delay: Trip::delay_minutes(planned_when, when),
        cancelled: raw.cancelled.as_ref().is_some_and(is_truthy),
        platform: raw.platform.as_ref().map(platform_string).unwrap_or_default(),
    })
}

/// Convert a departures payload into trips sorted by actual time.
pub fn convert_departures(payload: Value) -> Vec<Trip> {
    let mut trips: Vec<Trip> = departure_rows(payload)
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<RawDeparture>(row) {
            Ok(raw) => Some(raw),
            Err(e) => {
                debug!("skipping malformed departure: {e}");
                None
            }
        })
        .filter_map(|raw| convert_departure(&raw))
        .collect();

    trips.sort_by_key(|t| t.when);
    trips
}

/// `<planned time, ISO 8601 UTC with millis>-<line name>`.
fn synthesize_trip_id(planned: DateTime<Utc>, line_name: &str) -> String {
    format!(
        "{}-{}",
        planned.to_rfc3339_opts(SecondsFormat::Millis, true),
        line_name
    )
}

fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn platform_string(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransitType;
    use crate::vbb::types::RawGeoLocation;
    use serde_json::json;

    fn raw_station(name: Option<&str>, lat: Option<f64>, lon: Option<f64>) -> RawLocation {
        RawLocation {
            kind: Some("stop".to_string()),
            id: Some("900000100001".to_string()),
            name: name.map(str::to_string),
            location: Some(RawGeoLocation {
                kind: Some("location".to_string()),
                latitude: lat,
                longitude: lon,
            }),
        }
    }

    #[test]
    fn station_validity() {
        assert!(is_valid_station(&raw_station(
            Some("Alex"),
            Some(52.5),
            Some(13.4)
        )));
        assert!(!is_valid_station(&raw_station(None, Some(52.5), Some(13.4))));
        assert!(!is_valid_station(&raw_station(Some(""), Some(52.5), Some(13.4))));
        assert!(!is_valid_station(&raw_station(Some("Alex"), None, Some(13.4))));
        assert!(!is_valid_station(&raw_station(Some("Alex"), Some(52.5), None)));

        let mut no_location = raw_station(Some("Alex"), Some(52.5), Some(13.4));
        no_location.location = None;
        assert!(!is_valid_station(&no_location));
    }

    #[test]
    fn normalize_strips_city_suffix() {
        let station =
            normalize_station(&raw_station(Some("Alex (Berlin)"), Some(52.5), Some(13.4)))
                .unwrap();

        assert_eq!(station.name, "Alex");
        assert_eq!(station.id, "900000100001");
        assert_eq!(station.kind, "stop");
        assert_eq!(station.location.kind, "location");
        assert_eq!(station.location.latitude, 52.5);
        assert_eq!(station.location.longitude, 13.4);
        assert_eq!(station.distance, None);
    }

    #[test]
    fn normalize_trims_and_keeps_other_suffixes() {
        let station =
            normalize_station(&raw_station(Some("  Potsdam Hbf  "), Some(52.39), Some(13.06)))
                .unwrap();
        assert_eq!(station.name, "Potsdam Hbf");
    }

    #[test]
    fn nearby_rejects_non_array() {
        let err = convert_nearby(json!({"error": "nope"}), 6).unwrap_err();
        assert!(matches!(err, ApiError::InvalidFormat));
    }

    #[test]
    fn nearby_filters_and_truncates() {
        let payload = json!([
            {"type": "stop", "id": "1", "name": "A (Berlin)", "location": {"type": "location", "latitude": 52.5, "longitude": 13.4}},
            {"type": "stop", "id": "2", "name": 42, "location": {"type": "location", "latitude": 52.5, "longitude": 13.4}},
            {"type": "stop", "id": "3", "name": "C", "location": {"type": "location"}},
            {"type": "stop", "id": "4", "name": "D", "location": {"type": "location", "latitude": 52.6, "longitude": 13.5}},
            {"type": "stop", "id": "5", "name": "E", "location": {"type": "location", "latitude": 52.7, "longitude": 13.6}}
        ]);

        let stations = convert_nearby(payload, 2).unwrap();
        let ids: Vec<_> = stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
        assert_eq!(stations[0].name, "A");
    }

    #[test]
    fn rows_from_both_shapes() {
        assert_eq!(departure_rows(json!([{"a": 1}])).len(), 1);
        assert_eq!(departure_rows(json!({"departures": [{"a": 1}, {"b": 2}]})).len(), 2);
        assert!(departure_rows(json!({"other": []})).is_empty());
        assert!(departure_rows(json!("nope")).is_empty());
    }

    #[test]
    fn departure_mapping() {
        let raw: RawDeparture = serde_json::from_value(json!({
            "tripId": "1|2345|6",
            "line": {"name": "S7", "product": "suburban"},
            "direction": "Potsdam Hbf",
            "when": "2024-01-01T10:03:00+01:00",
            "plannedWhen": "2024-01-01T10:00:00+01:00",
            "cancelled": false,
            "platform": "2"
        }))
        .unwrap();

        let trip = convert_departure(&raw).unwrap();
        assert_eq!(trip.trip_id, "1|2345|6");
        assert_eq!(trip.line.name, "S7");
        assert_eq!(trip.line.product, TransitType::Sbahn);
        assert_eq!(trip.direction, "Potsdam Hbf");
        assert_eq!(trip.delay, 3);
        assert!(!trip.cancelled);
        assert_eq!(trip.platform, "2");
        assert_eq!(
            trip.planned_when.to_rfc3339_opts(SecondsFormat::Secs, true),
            "2024-01-01T09:00:00Z"
        );
    }

    #[test]
    fn departure_defaults_and_coercions() {
        let raw: RawDeparture = serde_json::from_value(json!({
            "line": {"name": "M41", "mode": "BUS"},
            "direction": "Sonnenallee",
            "plannedWhen": "2024-01-01T10:00:00Z",
            "cancelled": 1,
            "platform": 4
        }))
        .unwrap();

        let trip = convert_departure(&raw).unwrap();
        assert_eq!(trip.trip_id, "2024-01-01T10:00:00.000Z-M41");
        assert_eq!(trip.line.product, TransitType::Bus);
        assert_eq!(trip.when, trip.planned_when);
        assert_eq!(trip.delay, 0);
        assert!(trip.cancelled);
        assert_eq!(trip.platform, "4");
    }

    #[test]
    fn departure_missing_product_is_bus() {
        let raw: RawDeparture = serde_json::from_value(json!({
            "line": {"name": "X"},
            "direction": "Somewhere",
            "when": "2024-01-01T10:00:00Z"
        }))
        .unwrap();

        let trip = convert_departure(&raw).unwrap();
        assert_eq!(trip.line.product, TransitType::Bus);
        assert_eq!(trip.platform, "");
    }

    #[test]
    fn departure_rows_missing_required_fields_dropped() {
        let payload = json!({"departures": [
            {"line": {"name": "U2"}, "direction": "Pankow"},
            {"line": {}, "direction": "Pankow", "when": "2024-01-01T10:00:00Z"},
            {"line": {"name": "U2"}, "when": "2024-01-01T10:00:00Z"},
            {"direction": "Pankow", "when": "2024-01-01T10:00:00Z"},
            {"line": {"name": "U2"}, "direction": "Pankow", "when": "2024-01-01T10:00:00Z"}
        ]});

        let trips = convert_departures(payload);
        assert_eq!(trips.len(), 1);
    }

    #[test]
    fn departures_sorted_by_actual_time() {
        let payload = json!([
            {"tripId": "late", "line": {"name": "U2"}, "direction": "Pankow",
             "plannedWhen": "2024-01-01T10:00:00Z", "when": "2024-01-01T10:09:00Z"},
            {"tripId": "early", "line": {"name": "U2"}, "direction": "Pankow",
             "plannedWhen": "2024-01-01T10:05:00Z", "when": "2024-01-01T10:05:00Z"}
        ]);

        let ids: Vec<_> = convert_departures(payload)
            .into_iter()
            .map(|t| t.trip_id)
            .collect();
        assert_eq!(ids, vec!["early", "late"]);
    }
}
