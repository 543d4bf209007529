//! Location providers: the capability the facade consumes, and its Google
//! Maps implementation.

use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::dto::{DirectionsResponse, GeocodingResponse};
use super::shaping;
use super::types::{Address, LatLng, LocationError, Route, TravelMode};
use crate::config::GoogleMapsConfig;

/// Source of geocoding, routing and distance data.
///
/// "Nothing found" is a value, not an error: a zero coordinate, `None`, an
/// empty route or `0` meters. `Err` is reserved for transport and decoding
/// failures.
pub trait LocationProvider: Send + Sync {
    fn geocode(&self, address: &Address) -> Result<LatLng, LocationError>;

    fn reverse_geocode(&self, point: LatLng) -> Result<Option<Address>, LocationError>;

    fn route(&self, from: LatLng, to: LatLng) -> Result<Route, LocationError>;

    fn distance_meters(&self, from: LatLng, to: LatLng) -> Result<u32, LocationError>;
}

// ─── Google Maps ────────────────────────────────────────────────

const USER_AGENT: &str = concat!("location-services/", env!("CARGO_PKG_VERSION"));

/// Blocking Google Maps client.
pub struct GoogleMapsProvider {
    agent: ureq::Agent,
    config: GoogleMapsConfig,
}

impl GoogleMapsProvider {
    pub fn new(config: GoogleMapsConfig) -> Result<Self, LocationError> {
        if config.api_key.trim().is_empty() {
            return Err(LocationError::MissingApiKey);
        }
        if config.timeout_secs == 0 {
            return Err(LocationError::InvalidInput("timeout must be at least 1 second".into()));
        }
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build();
        Ok(Self { agent, config })
    }

    /// Use a different travel mode for routes and distances.
    pub fn with_mode(mut self, mode: TravelMode) -> Self {
        self.config.travel_mode = mode;
        self
    }

    pub fn travel_mode(&self) -> TravelMode {
        self.config.travel_mode
    }

    fn directions(&self, from: LatLng, to: LatLng) -> Result<Option<DirectionsResponse>, LocationError> {
        let params = [
            ("origin", from.to_string()),
            ("destination", to.to_string()),
            ("avoid", "highways".to_string()),
            ("mode", self.config.travel_mode.to_string()),
        ];
        let response: Option<DirectionsResponse> = self.fetch(&self.config.directions_url, &params)?;
        if let Some(ref r) = response {
            log_status("directions", &r.status, r.error_message.as_deref());
        }
        Ok(response)
    }

    /// GET `url` with `params` plus the API key. An empty body yields `None`.
    fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>, LocationError> {
        debug!(url, ?params, "provider request");

        let mut request = self.agent.get(url);
        for (name, value) in params {
            request = request.query(name, value);
        }
        let body = request
            .query("key", &self.config.api_key)
            .call()
            .map_err(|e| network_error(url, e))?
            .into_string()
            .map_err(|e| LocationError::InvalidResponse(e.to_string()))?;

        if body.trim().is_empty() {
            debug!(url, "empty response body");
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| LocationError::InvalidResponse(e.to_string()))
    }
}

impl LocationProvider for GoogleMapsProvider {
    fn geocode(&self, address: &Address) -> Result<LatLng, LocationError> {
        if address.is_empty() {
            return Err(LocationError::InvalidInput("address is empty".into()));
        }
        let params = [("address", address.to_string())];
        let response: Option<GeocodingResponse> = self.fetch(&self.config.geocode_url, &params)?;
        Ok(match response {
            Some(r) => {
                log_status("geocode", &r.status, r.error_message.as_deref());
                shaping::location_from_geocoding(&r)
            }
            None => LatLng::default(),
        })
    }

    fn reverse_geocode(&self, point: LatLng) -> Result<Option<Address>, LocationError> {
        let params = [("latlng", point.to_string())];
        let response: Option<GeocodingResponse> =
            self.fetch(&self.config.reverse_geocode_url, &params)?;
        Ok(response.and_then(|r| {
            log_status("reverse geocode", &r.status, r.error_message.as_deref());
            shaping::address_from_geocoding(&r)
        }))
    }

    fn route(&self, from: LatLng, to: LatLng) -> Result<Route, LocationError> {
        Ok(self
            .directions(from, to)?
            .map(|r| shaping::route_from_directions(&r))
            .unwrap_or_default())
    }

    fn distance_meters(&self, from: LatLng, to: LatLng) -> Result<u32, LocationError> {
        Ok(self
            .directions(from, to)?
            .map(|r| shaping::distance_from_directions(&r))
            .unwrap_or(0))
    }
}

fn log_status(operation: &str, status: &str, message: Option<&str>) {
    if !status.eq_ignore_ascii_case("ok") {
        warn!(operation, status, message = message.unwrap_or(""), "provider returned non-ok status");
    }
}

/// Error text without the request URL's query string, which carries the key.
fn network_error(url: &str, err: ureq::Error) -> LocationError {
    match err {
        ureq::Error::Status(code, _) => {
            LocationError::Network(format!("{} returned HTTP {}", url, code))
        }
        ureq::Error::Transport(t) => LocationError::Network(match t.message() {
            Some(msg) => format!("{}: {} ({})", url, t.kind(), msg),
            None => format!("{}: {}", url, t.kind()),
        }),
    }
}
