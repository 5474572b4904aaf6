//! Merging "load more" departures into an existing list.

use std::collections::HashSet;

use crate::domain::Trip;

/// Union `prior` and `fetched`, de-duplicated by trip id.
///
/// Rows in `fetched` whose trip id already appears in `prior` are dropped,
/// so the prior version of a trip wins. The result is sorted by planned
/// time (stable, so ties keep prior-before-fetched order) and capped at
/// `cap` entries.
pub fn merge_departures(prior: &[Trip], fetched: Vec<Trip>, cap: usize) -> Vec<Trip> {
    let seen: HashSet<&str> = prior.iter().map(|t| t.trip_id.as_str()).collect();

    let new_rows: Vec<Trip> = fetched
        .into_iter()
        .filter(|t| !seen.contains(t.trip_id.as_str()))
        .collect();

    let mut merged: Vec<Trip> = prior.iter().cloned().chain(new_rows).collect();
    merged.sort_by_key(|t| t.planned_when);
    merged.truncate(cap);
    merged
}
