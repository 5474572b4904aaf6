//! Distance ranking and transit-type filtering of stations.

use std::collections::BTreeSet;

use crate::domain::{Coordinate, Station, TransitType};

/// Rank stations for display.
///
/// 1. If `enabled_types` is given, keep only stations whose transit type is
///    in the set.
/// 2. Without a `reference` point, return the filtered list in its original
///    order, untruncated.
/// 3. Otherwise attach each station's distance from `reference`, sort
///    nearest-first and keep at most `max` stations.
pub fn rank_stations(
    stations: &[Station],
    reference: Option<Coordinate>,
    enabled_types: Option<&BTreeSet<TransitType>>,
    max: usize,
) -> Vec<Station> {
    let filtered = stations
        .iter()
        .filter(|s| enabled_types.is_none_or(|types| types.contains(&s.transit_type())));

    let Some(origin) = reference else {
        return filtered.cloned().collect();
    };

    let mut ranked: Vec<Station> = filtered.map(|s| s.with_distance_from(&origin)).collect();
    ranked.sort_by(|a, b| {
        let da = a.distance.unwrap_or(f64::INFINITY);
        let db = b.distance.unwrap_or(f64::INFINITY);
        da.total_cmp(&db)
    });
    ranked.truncate(max);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Location;

    fn station(id: &str, kind: &str, lat: f64, lon: f64) -> Station {
        Station {
            id: id.to_string(),
            name: id.to_string(),
            kind: kind.to_string(),
            location: Location {
                kind: "location".to_string(),
                latitude: lat,
                longitude: lon,
            },
            distance: None,
        }
    }

    fn ids(stations: &[Station]) -> Vec<&str> {
        stations.iter().map(|s| s.id.as_str()).collect()
    }

    fn sample() -> Vec<Station> {
        vec![
            station("far", "stop", 52.60, 13.40),
            station("near", "stop", 52.501, 13.40),
            station("mid", "stop", 52.55, 13.40),
        ]
    }

    #[test]
    fn no_reference_keeps_order_and_length() {
        let stations = sample();
        let ranked = rank_stations(&stations, None, None, 1);

        assert_eq!(ids(&ranked), vec!["far", "near", "mid"]);
        assert!(ranked.iter().all(|s| s.distance.is_none()));
    }

    #[test]
    fn sorted_by_distance_and_truncated() {
        let origin = Coordinate::new(52.50, 13.40);
        let ranked = rank_stations(&sample(), Some(origin), None, 2);

        assert_eq!(ids(&ranked), vec!["near", "mid"]);
        let d0 = ranked[0].distance.unwrap();
        let d1 = ranked[1].distance.unwrap();
        assert!(d0 < d1);
        assert!(d0 > 100.0 && d0 < 120.0, "got {d0}");
    }

    #[test]
    fn type_filter_applies_with_and_without_reference() {
        let stations = vec![
            station("s", "suburban", 52.51, 13.40),
            station("b", "stop", 52.50, 13.40),
        ];
        let only_sbahn: BTreeSet<_> = [TransitType::Sbahn].into_iter().collect();

        let ranked = rank_stations(&stations, None, Some(&only_sbahn), 6);
        assert_eq!(ids(&ranked), vec!["s"]);

        let origin = Coordinate::new(52.50, 13.40);
        let ranked = rank_stations(&stations, Some(origin), Some(&only_sbahn), 6);
        assert_eq!(ids(&ranked), vec!["s"]);
    }

    #[test]
    fn empty_filter_removes_everything() {
        let empty = BTreeSet::new();
        assert!(rank_stations(&sample(), None, Some(&empty), 6).is_empty());
    }
}
