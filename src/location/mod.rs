//! Location services: geocoding, reverse geocoding, routing, distances and
//! geofence containment.
//!
//! The geofence engine and result shaping are pure. Everything that talks to
//! the network sits behind [`LocationProvider`].

pub mod dto;
pub mod geofence;
pub mod providers;
pub mod service;
pub mod shaping;
pub mod types;

pub use geofence::{check_fence, is_inside};
pub use providers::{GoogleMapsProvider, LocationProvider};
pub use service::LocationService;
pub use shaping::{parse_distance_meters, DistanceText};
pub use types::{Address, LatLng, LocationError, Route, TravelMode};
