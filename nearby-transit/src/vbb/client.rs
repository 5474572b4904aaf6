//! HTTP client for the VBB `transport.rest` API.
//!
//! Only two endpoints are used: nearby locations and station departures.
//! Responses are returned as raw JSON so the caller can apply its own
//! tolerance rules (see [`super::convert`]).

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use super::error::ApiError;

/// Default base URL for the VBB REST API.
const DEFAULT_BASE_URL: &str = "https://v6.vbb.transport.rest";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Parameters for `GET /locations/nearby`.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Maximum number of results.
    pub results: usize,
    /// Search radius in metres.
    pub distance: u32,
}

/// Parameters for `GET /stops/{id}/departures`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeparturesQuery {
    /// Look-ahead window in minutes.
    pub duration_mins: u32,
    /// Maximum number of results.
    pub results: usize,
    /// Only return departures at or after this time.
    pub when: Option<DateTime<Utc>>,
}

/// Source of transit data.
///
/// Implemented by [`VbbClient`] for the real API and by
/// [`super::MockTransitApi`] for tests. Futures returned here are wrapped in
/// abortable futures by the stations store, so implementations must not rely
/// on running to completion.
pub trait TransitApi: Send + Sync {
    /// Stops near a point, as a raw JSON payload.
    fn nearby_locations(
        &self,
        query: &NearbyQuery,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// Upcoming departures at a station, as a raw JSON payload.
    fn departures(
        &self,
        station_id: &str,
        query: &DeparturesQuery,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;
}

/// Configuration for the VBB client.
#[derive(Debug, Clone)]
pub struct VbbConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Value sent in the `User-Agent` header
    pub user_agent: String,
}

impl VbbConfig {
    /// Create a config pointing at the public VBB instance.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("nearby-transit/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set a custom base URL (for self-hosted instances or testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for VbbConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// VBB REST API client.
#[derive(Debug, Clone)]
pub struct VbbClient {
    http: reqwest::Client,
    base_url: Url,
}

impl VbbClient {
    /// Create a new client with the given configuration.
    pub fn new(config: VbbConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ApiError::Url(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Url(format!("cannot be a base: {base_url}")));
        }

        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|_| {
            ApiError::Url(format!("invalid user agent: {}", config.user_agent))
        })?;
        headers.insert(USER_AGENT, user_agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json(&self, url: Url, query: &[(&str, String)]) -> Result<Value, ApiError> {
        debug!(%url, ?query, "GET");

        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ApiError::from_status(status));
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| ApiError::Json {
            message: e.to_string(),
        })
    }
}

impl TransitApi for VbbClient {
    async fn nearby_locations(&self, query: &NearbyQuery) -> Result<Value, ApiError> {
        let url = self.endpoint(&["locations", "nearby"]);
        let params = [
            ("latitude", query.latitude.to_string()),
            ("longitude", query.longitude.to_string()),
            ("results", query.results.to_string()),
            ("distance", query.distance.to_string()),
            ("stops", "true".to_string()),
        ];

        self.get_json(url, &params).await
    }

    async fn departures(
        &self,
        station_id: &str,
        query: &DeparturesQuery,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(&["stops", station_id, "departures"]);
        let mut params = vec![
            ("duration", query.duration_mins.to_string()),
            ("results", query.results.to_string()),
        ];
        if let Some(when) = query.when {
            params.push(("when", when.to_rfc3339_opts(SecondsFormat::Millis, true)));
        }

        self.get_json(url, &params).await
    }
}
