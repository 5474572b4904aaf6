//! Geographic coordinates and great-circle distance.

use std::fmt;

/// Mean Earth radius in metres, as used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in metres between two lat/long pairs (degrees).
///
/// Uses the haversine formula. Identical points give exactly `0.0`, and the
/// result does not depend on argument order.
///
/// # Examples
///
/// ```
/// use nearby_transit::domain::distance;
///
/// // Berlin Mitte to Potsdam is roughly 27 km.
/// let d = distance(52.52, 13.405, 52.39, 13.0645);
/// assert!(d > 25_000.0 && d < 29_000.0);
/// ```
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Returns true if both values are finite and inside the WGS84 ranges.
pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && latitude.abs() <= 90.0
        && longitude.abs() <= 180.0
}

/// A latitude/longitude pair in degrees.
///
/// Not validated on construction: the map widget hands us centres that we
/// store as-is. Use [`Coordinate::is_valid`] where range matters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// See [`is_valid_coordinate`].
    pub fn is_valid(&self) -> bool {
        is_valid_coordinate(self.latitude, self.longitude)
    }

    /// Haversine distance to `other` in metres.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_points_are_zero_apart() {
        assert_eq!(distance(52.5, 13.4, 52.5, 13.4), 0.0);
    }

    #[test]
    fn berlin_to_potsdam() {
        let d = distance(52.52, 13.405, 52.39, 13.0645);
        assert!(d > 25_000.0, "got {d}");
        assert!(d < 29_000.0, "got {d}");
    }

    #[test]
    fn quarter_meridian() {
        // Equator to pole along a meridian is a quarter of the circumference.
        let d = distance(0.0, 0.0, 90.0, 0.0);
        let expected = std::f64::consts::PI * EARTH_RADIUS_M / 2.0;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn valid_coordinates() {
        assert!(is_valid_coordinate(0.0, 0.0));
        assert!(is_valid_coordinate(90.0, 180.0));
        assert!(is_valid_coordinate(-90.0, -180.0));
        assert!(is_valid_coordinate(52.52, 13.405));
    }

    #[test]
    fn invalid_coordinates() {
        assert!(!is_valid_coordinate(90.1, 0.0));
        assert!(!is_valid_coordinate(0.0, -180.5));
        assert!(!is_valid_coordinate(f64::NAN, 0.0));
        assert!(!is_valid_coordinate(0.0, f64::NAN));
        assert!(!is_valid_coordinate(f64::INFINITY, 0.0));
        assert!(!is_valid_coordinate(0.0, f64::NEG_INFINITY));
    }

    #[test]
    fn coordinate_distance_matches_free_function() {
        let alex = Coordinate::new(52.521508, 13.411267);
        let zoo = Coordinate::new(52.507171, 13.332710);
        assert_eq!(
            alex.distance_to(&zoo),
            distance(52.521508, 13.411267, 52.507171, 13.332710)
        );
    }

    #[test]
    fn display() {
        let c = Coordinate::new(52.52, 13.405);
        assert_eq!(c.to_string(), "52.520000,13.405000");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn same_point_is_zero(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            prop_assert_eq!(distance(lat, lon, lat, lon), 0.0);
        }

        #[test]
        fn commutative(
            lat1 in -90.0f64..=90.0, lon1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0, lon2 in -180.0f64..=180.0,
        ) {
            let ab = distance(lat1, lon1, lat2, lon2);
            let ba = distance(lat2, lon2, lat1, lon1);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        #[test]
        fn bounded_by_half_circumference(
            lat1 in -90.0f64..=90.0, lon1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0, lon2 in -180.0f64..=180.0,
        ) {
            let d = distance(lat1, lon1, lat2, lon2);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_M + 1e-6);
        }

        #[test]
        fn out_of_range_latitude_rejected(lat in 90.0001f64..1000.0, lon in -180.0f64..=180.0) {
            prop_assert!(!is_valid_coordinate(lat, lon));
            prop_assert!(!is_valid_coordinate(-lat, lon));
        }
    }
}
