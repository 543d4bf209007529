use crate::location::LocationService;

pub struct AppState {
    /// `None` when no API key is configured; only geofence checks work then.
    pub service: Option<LocationService>,
}
