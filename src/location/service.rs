//! Location service facade: one provider plus the geofence engine.

use std::sync::Arc;
use tracing::debug;

use super::geofence;
use super::providers::LocationProvider;
use super::types::{Address, LatLng, LocationError, Route};

/// Public entry point for geocoding, routing, distances and geofencing.
///
/// Cloning is cheap; clones share the provider.
#[derive(Clone)]
pub struct LocationService {
    provider: Arc<dyn LocationProvider>,
}

impl LocationService {
    pub fn new<P: LocationProvider + 'static>(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    pub fn from_arc(provider: Arc<dyn LocationProvider>) -> Self {
        Self { provider }
    }

    /// Coordinates of `address`, or `(0, 0)` when the provider found nothing.
    pub fn geocode(&self, address: &Address) -> Result<LatLng, LocationError> {
        let point = self.provider.geocode(address)?;
        debug!(%address, %point, "geocoded");
        Ok(point)
    }

    /// Street address at `point`, if the provider has one.
    pub fn reverse_geocode(&self, point: LatLng) -> Result<Option<Address>, LocationError> {
        let address = self.provider.reverse_geocode(point)?;
        debug!(%point, found = address.is_some(), "reverse geocoded");
        Ok(address)
    }

    /// Waypoints from `from` to `to`; empty when there is no route.
    pub fn route(&self, from: LatLng, to: LatLng) -> Result<Route, LocationError> {
        let route = self.provider.route(from, to)?;
        debug!(%from, %to, waypoints = route.len(), "route");
        Ok(route)
    }

    /// Travel distance in meters; `0` when it couldn't be measured.
    pub fn distance_meters(&self, from: LatLng, to: LatLng) -> Result<u32, LocationError> {
        let meters = self.provider.distance_meters(from, to)?;
        debug!(%from, %to, meters, "distance");
        Ok(meters)
    }

    /// Whether `point` is inside the closed polygon `fence`.
    pub fn is_inside(&self, point: LatLng, fence: &[LatLng]) -> bool {
        geofence::is_inside(point, fence)
    }

    // ─── Async variants ──────────────────────────────────────────
    //
    // Same calls on tokio's blocking pool. Must run inside a tokio runtime.

    pub async fn geocode_async(&self, address: Address) -> Result<LatLng, LocationError> {
        self.spawn(move |s| s.geocode(&address)).await
    }

    pub async fn reverse_geocode_async(&self, point: LatLng) -> Result<Option<Address>, LocationError> {
        self.spawn(move |s| s.reverse_geocode(point)).await
    }

    pub async fn route_async(&self, from: LatLng, to: LatLng) -> Result<Route, LocationError> {
        self.spawn(move |s| s.route(from, to)).await
    }

    pub async fn distance_meters_async(&self, from: LatLng, to: LatLng) -> Result<u32, LocationError> {
        self.spawn(move |s| s.distance_meters(from, to)).await
    }

    async fn spawn<T, F>(&self, f: F) -> Result<T, LocationError>
    where
        F: FnOnce(LocationService) -> Result<T, LocationError> + Send + 'static,
        T: Send + 'static,
    {
        let service = self.clone();
        tokio::task::spawn_blocking(move || f(service))
            .await
            .map_err(|e| LocationError::Task(e.to_string()))?
    }
}
