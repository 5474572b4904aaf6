//! Scripted transit API for testing without network access.
//!
//! Responses are queued per endpoint (and per station for departures) and
//! handed out in order. A response can also be held back until the test
//! releases it, which is how request cancellation is exercised.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::oneshot;

use super::client::{DeparturesQuery, NearbyQuery, TransitApi};
use super::error::ApiError;

/// Sender used to release a held-back mock response.
pub type Release = oneshot::Sender<Result<Value, ApiError>>;

enum Scripted {
    Ready(Result<Value, ApiError>),
    Held(oneshot::Receiver<Result<Value, ApiError>>),
}

impl Scripted {
    async fn resolve(self) -> Result<Value, ApiError> {
        match self {
            Scripted::Ready(result) => result,
            // Dropping the sender without answering behaves like a dead upstream.
            Scripted::Held(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ApiError::from_status(reqwest::StatusCode::BAD_GATEWAY))),
        }
    }
}

#[derive(Default)]
struct MockState {
    nearby: VecDeque<Scripted>,
    departures: HashMap<String, VecDeque<Scripted>>,
    nearby_calls: Vec<NearbyQuery>,
    departure_calls: Vec<(String, DeparturesQuery)>,
}

/// Mock transit API serving queued responses.
///
/// An endpoint with nothing queued answers `404 Not Found`.
#[derive(Default)]
pub struct MockTransitApi {
    state: Mutex<MockState>,
}

impl MockTransitApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a nearby-locations response.
    pub fn push_nearby(&self, response: Result<Value, ApiError>) {
        self.state().nearby.push_back(Scripted::Ready(response));
    }

    /// Queue a nearby-locations response that resolves when released.
    pub fn hold_nearby(&self) -> Release {
        let (tx, rx) = oneshot::channel();
        self.state().nearby.push_back(Scripted::Held(rx));
        tx
    }

    /// Queue a departures response for one station.
    pub fn push_departures(&self, station_id: &str, response: Result<Value, ApiError>) {
        self.state()
            .departures
            .entry(station_id.to_string())
            .or_default()
            .push_back(Scripted::Ready(response));
    }

    /// Queue a departures response for one station that resolves when released.
    pub fn hold_departures(&self, station_id: &str) -> Release {
        let (tx, rx) = oneshot::channel();
        self.state()
            .departures
            .entry(station_id.to_string())
            .or_default()
            .push_back(Scripted::Held(rx));
        tx
    }

    /// Every nearby-locations query received so far.
    pub fn nearby_calls(&self) -> Vec<NearbyQuery> {
        self.state().nearby_calls.clone()
    }

    /// Every departures query received so far, with its station id.
    pub fn departure_calls(&self) -> Vec<(String, DeparturesQuery)> {
        self.state().departure_calls.clone()
    }

    /// Total number of requests received on either endpoint.
    pub fn call_count(&self) -> usize {
        let state = self.state();
        state.nearby_calls.len() + state.departure_calls.len()
    }

    fn next_nearby(&self, query: &NearbyQuery) -> Scripted {
        let mut state = self.state();
        state.nearby_calls.push(query.clone());
        state.nearby.pop_front().unwrap_or_else(not_found)
    }

    fn next_departures(&self, station_id: &str, query: &DeparturesQuery) -> Scripted {
        let mut state = self.state();
        state
            .departure_calls
            .push((station_id.to_string(), query.clone()));
        state
            .departures
            .get_mut(station_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(not_found)
    }
}

fn not_found() -> Scripted {
    Scripted::Ready(Err(ApiError::from_status(reqwest::StatusCode::NOT_FOUND)))
}

impl TransitApi for MockTransitApi {
    async fn nearby_locations(&self, query: &NearbyQuery) -> Result<Value, ApiError> {
        self.next_nearby(query).resolve().await
    }

    async fn departures(
        &self,
        station_id: &str,
        query: &DeparturesQuery,
    ) -> Result<Value, ApiError> {
        self.next_departures(station_id, query).resolve().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nearby_query() -> NearbyQuery {
        NearbyQuery {
            latitude: 52.52,
            longitude: 13.405,
            results: 6,
            distance: 1000,
        }
    }

    #[tokio::test]
    async fn serves_queued_responses_in_order() {
        let api = MockTransitApi::new();
        api.push_nearby(Ok(json!([1])));
        api.push_nearby(Ok(json!([2])));

        assert_eq!(api.nearby_locations(&nearby_query()).await.unwrap(), json!([1]));
        assert_eq!(api.nearby_locations(&nearby_query()).await.unwrap(), json!([2]));
        assert_eq!(api.nearby_calls().len(), 2);
    }

    #[tokio::test]
    async fn empty_queue_is_not_found() {
        let api = MockTransitApi::new();
        let query = DeparturesQuery {
            duration_mins: 30,
            results: 6,
            when: None,
        };

        let err = api.departures("123", &query).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
        assert_eq!(api.call_count(), 1);
    }

    #[tokio::test]
    async fn held_response_waits_for_release() {
        let api = MockTransitApi::new();
        let release = api.hold_nearby();
        let query = nearby_query();

        let (result, ()) = tokio::join!(api.nearby_locations(&query), async {
            release.send(Ok(json!([]))).unwrap();
        });

        assert_eq!(result.unwrap(), json!([]));
    }
}
