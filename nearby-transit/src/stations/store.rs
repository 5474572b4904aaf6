//! The stations/departures store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use futures::future::{Abortable, Aborted};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::domain::{Coordinate, Station, Trip, is_valid_coordinate};
use crate::favorites::FavoritesStore;
use crate::preferences::{PreferencesStore, View};
use crate::vbb::{ApiError, DeparturesQuery, NearbyQuery, TransitApi, convert_departures, convert_nearby};

use super::cache::DepartureCache;
use super::config::SyncConfig;
use super::events::StoreEvent;
use super::inflight::InFlight;
use super::merge::merge_departures;
use super::rank::rank_stations;

/// Error shown when `fetch_nearby_stations` is given an out-of-range point.
pub const INVALID_COORDINATES: &str = "Invalid coordinates provided";

const STATIONS_FALLBACK: &str = "An error occurred fetching stations";
const DEPARTURES_FALLBACK: &str = "An error occurred fetching departures";

/// How `fetch_departures` treats the cache and the existing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepartureMode {
    /// Serve a fresh cached list if there is one, else fetch and replace.
    #[default]
    Cached,
    /// Always fetch, replace the list and refresh the cache.
    Force,
    /// Fetch departures after the current last one and merge them in.
    /// The cache is neither read nor written.
    LoadMore,
}

impl DepartureMode {
    /// Map the `(force, load_more)` flag pair. `load_more` takes precedence.
    pub fn from_flags(force: bool, load_more: bool) -> Self {
        match (force, load_more) {
            (_, true) => DepartureMode::LoadMore,
            (true, false) => DepartureMode::Force,
            (false, false) => DepartureMode::Cached,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RequestKey {
    Nearby,
    Departures(String),
}

#[derive(Default)]
struct SyncState {
    stations: Vec<Station>,
    departures: HashMap<String, Vec<Trip>>,
    loading: bool,
    error: Option<String>,
    user_location: Option<Coordinate>,
    map_center: Option<Coordinate>,
    requests: InFlight<RequestKey>,
}

/// Nearby stations and their departures, synchronised with a transit API.
///
/// All operations take `&self` and never return errors: failures end up in
/// [`StationsStore::error`], cancellations are silent. A newer request for
/// the same key (the nearby lookup, or one station's departures) aborts the
/// older one, and a late result from an aborted request is discarded.
pub struct StationsStore<A> {
    api: A,
    preferences: Arc<PreferencesStore>,
    favorites: Arc<FavoritesStore>,
    config: SyncConfig,
    cache: DepartureCache,
    state: Mutex<SyncState>,
    events: broadcast::Sender<StoreEvent>,
}

impl<A: TransitApi> StationsStore<A> {
    pub fn new(
        api: A,
        preferences: Arc<PreferencesStore>,
        favorites: Arc<FavoritesStore>,
        config: SyncConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            api,
            preferences,
            favorites,
            cache: DepartureCache::new(&config),
            config,
            state: Mutex::new(SyncState::default()),
            events,
        }
    }

    /// The underlying API client.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Receive a [`StoreEvent`] after every state change.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, events: Vec<StoreEvent>) {
        for event in events {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }

    /// Fetch stops near a point and replace the station list.
    ///
    /// Invalid coordinates set [`INVALID_COORDINATES`] and make no request.
    /// The point becomes the user location used for ranking.
    pub async fn fetch_nearby_stations(&self, latitude: f64, longitude: f64) {
        if !is_valid_coordinate(latitude, longitude) {
            warn!(latitude, longitude, "rejecting invalid coordinates");
            self.lock().error = Some(INVALID_COORDINATES.to_string());
            self.emit(vec![StoreEvent::ErrorChanged(Some(
                INVALID_COORDINATES.to_string(),
            ))]);
            return;
        }

        let prefs = self.preferences.preferences();
        let (ticket, registration) = {
            let mut state = self.lock();
            let begun = state.requests.begin(RequestKey::Nearby);
            state.loading = true;
            state.error = None;
            state.user_location = Some(Coordinate::new(latitude, longitude));
            begun
        };
        self.emit(vec![
            StoreEvent::LoadingChanged(true),
            StoreEvent::ErrorChanged(None),
        ]);

        let query = NearbyQuery {
            latitude,
            longitude,
            results: prefs.max_stations,
            distance: prefs.max_distance,
        };
        debug!(?query, "fetching nearby stations");
        let result = Abortable::new(self.api.nearby_locations(&query), registration).await;

        let mut events = Vec::new();
        {
            let mut state = self.lock();
            let committed = state.requests.finish(&RequestKey::Nearby, ticket);
            match result {
                _ if !committed => debug!("discarding superseded nearby response"),
                Err(Aborted) => debug!("nearby request aborted"),
                Ok(response) => {
                    match response.and_then(|payload| convert_nearby(payload, prefs.max_stations)) {
                        Ok(stations) => {
                            info!(count = stations.len(), "loaded nearby stations");
                            state.stations = stations;
                        }
                        Err(e) => {
                            warn!("failed to fetch stations: {e}");
                            let message = nearby_error_message(&e);
                            state.error = Some(message.clone());
                            state.stations.clear();
                            events.push(StoreEvent::ErrorChanged(Some(message)));
                        }
                    }
                    events.push(StoreEvent::StationsChanged);
                }
            }

            let loading = state.requests.is_live(&RequestKey::Nearby);
            if state.loading != loading {
                state.loading = loading;
                events.push(StoreEvent::LoadingChanged(loading));
            }
        }
        self.emit(events);
    }

    /// Move the manual map centre. It takes priority over the user location
    /// for ranking. Not validated.
    pub fn update_map_center(&self, latitude: f64, longitude: f64) {
        let center = Coordinate::new(latitude, longitude);
        self.lock().map_center = Some(center);
        self.emit(vec![StoreEvent::MapCenterChanged(center)]);
    }

    /// Fetch departures for one station.
    ///
    /// A blank id is logged and ignored. See [`DepartureMode`] for how the
    /// cache and the existing list are used. Requests for other stations are
    /// not affected.
    pub async fn fetch_departures(&self, station_id: &str, mode: DepartureMode) {
        if station_id.trim().is_empty() {
            warn!("no station id provided");
            return;
        }

        let prefs = self.preferences.preferences();
        let max = prefs.max_departures;
        let load_more = mode == DepartureMode::LoadMore;
        let key = RequestKey::Departures(station_id.to_string());

        let (ticket, registration, start_from) = {
            let mut state = self.lock();

            let cached = match mode {
                DepartureMode::Cached => self.cache.get(station_id),
                _ => None,
            };
            if let Some(cached) = cached {
                debug!(station_id, "serving departures from cache");
                state
                    .departures
                    .insert(station_id.to_string(), cached.trips.clone());
                drop(state);
                self.emit(vec![StoreEvent::DeparturesChanged {
                    station_id: station_id.to_string(),
                }]);
                return;
            }

            let start_from = if load_more {
                state
                    .departures
                    .get(station_id)
                    .and_then(|trips| trips.last())
                    .map(|t| t.planned_when)
            } else {
                None
            };

            let (ticket, registration) = state.requests.begin(key.clone());
            (ticket, registration, start_from)
        };

        let query = DeparturesQuery {
            duration_mins: self.config.departure_window_mins,
            results: if load_more {
                max.saturating_mul(self.config.load_more_request_factor)
            } else {
                max
            },
            when: start_from,
        };
        debug!(station_id, ?query, "fetching departures");
        let result = Abortable::new(self.api.departures(station_id, &query), registration).await;

        let mut events = Vec::new();
        {
            let mut state = self.lock();
            if !state.requests.finish(&key, ticket) {
                debug!(station_id, "discarding superseded departures response");
                return;
            }

            match result {
                Err(Aborted) => {
                    debug!(station_id, "departures request aborted");
                    return;
                }
                Ok(Ok(payload)) => {
                    let fetched = convert_departures(payload);
                    let trips = match state.departures.get(station_id) {
                        Some(prior) if load_more => merge_departures(
                            prior,
                            fetched,
                            max.saturating_mul(self.config.load_more_cap_factor),
                        ),
                        _ => {
                            let mut trips = fetched;
                            trips.truncate(max);
                            trips
                        }
                    };

                    if !load_more {
                        self.cache.insert(station_id, trips.clone());
                    }
                    debug!(station_id, count = trips.len(), "loaded departures");
                    state.departures.insert(station_id.to_string(), trips);
                }
                Ok(Err(e)) => {
                    warn!(station_id, "failed to fetch departures: {e}");
                    let message = departures_error_message(&e);
                    state.error = Some(message.clone());
                    state.departures.insert(station_id.to_string(), Vec::new());
                    events.push(StoreEvent::ErrorChanged(Some(message)));
                }
            }
            events.push(StoreEvent::DeparturesChanged {
                station_id: station_id.to_string(),
            });
        }
        self.emit(events);
    }

    /// Stations ranked for display.
    ///
    /// Recomputed on every call from the current stations, reference point
    /// (map centre, else user location) and preferences. In the favourites
    /// view only stations of an enabled transit type are kept.
    pub fn sorted_stations(&self) -> Vec<Station> {
        let prefs = self.preferences.preferences();
        let enabled = (self.favorites.active_view() == View::Favorites)
            .then_some(&prefs.enabled_transit_types);

        let state = self.lock();
        let reference = state.map_center.or(state.user_location);
        rank_stations(&state.stations, reference, enabled, prefs.max_stations)
    }

    /// Abort every in-flight request and reset all state. Idempotent.
    pub fn clear_stations(&self) {
        {
            let mut state = self.lock();
            state.requests.abort_all();
            self.cache.invalidate_all();

            state.stations.clear();
            state.departures.clear();
            state.loading = false;
            state.error = None;
            state.user_location = None;
            state.map_center = None;
        }
        info!("cleared stations");
        self.emit(vec![StoreEvent::Cleared]);
    }

    /// Re-fetch nearby stations whenever the location source reports a point.
    ///
    /// Runs until the sender is dropped. Updates arriving during a fetch are
    /// coalesced; only the latest point is fetched next.
    pub async fn follow_location(&self, mut location: watch::Receiver<Option<Coordinate>>) {
        loop {
            let current = *location.borrow_and_update();
            if let Some(point) = current {
                self.fetch_nearby_stations(point.latitude, point.longitude)
                    .await;
            }

            if location.changed().await.is_err() {
                debug!("location source closed");
                break;
            }
        }
    }

    /// Current station list, in API order, without distances.
    pub fn stations(&self) -> Vec<Station> {
        self.lock().stations.clone()
    }

    /// Departures for one station, if any have been loaded.
    pub fn departures(&self, station_id: &str) -> Option<Vec<Trip>> {
        self.lock().departures.get(station_id).cloned()
    }

    /// Departures for every station that has been loaded.
    pub fn all_departures(&self) -> HashMap<String, Vec<Trip>> {
        self.lock().departures.clone()
    }

    /// True while a nearby-stations request is in flight.
    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// Last error, if any.
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn user_location(&self) -> Option<Coordinate> {
        self.lock().user_location
    }

    pub fn map_center(&self) -> Option<Coordinate> {
        self.lock().map_center
    }

    /// When the cached departures for a station were fetched, if still fresh.
    pub fn cached_at(&self, station_id: &str) -> Option<DateTime<Utc>> {
        self.cache.get(station_id).map(|entry| entry.fetched_at)
    }

    /// Number of requests currently in flight.
    pub fn in_flight(&self) -> usize {
        self.lock().requests.len()
    }
}

fn message_or(err: &ApiError, fallback: &str) -> String {
    let message = err.to_string();
    if message.is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

fn nearby_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Status {
            status,
            status_text,
        } => format!("Failed to fetch stations: {status_text} ({status})"),
        other => message_or(other, STATIONS_FALLBACK),
    }
}

fn departures_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Status { status_text, .. } => {
            format!("Failed to fetch departures: {status_text}")
        }
        other => message_or(other, DEPARTURES_FALLBACK),
    }
}
