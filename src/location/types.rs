//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A latitude/longitude pair in degrees.
///
/// Out-of-range values are representable; use [`LatLng::is_valid`] where
/// user input has to be checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether latitude is within -90..=90 and longitude within -180..=180.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// Like [`LatLng::is_valid`], but as a `Result` for `?` at input boundaries.
    pub fn validated(self) -> Result<Self, LocationError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(LocationError::InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Parses `"lat,lng"`, e.g. `"59.3293,18.0686"`.
impl FromStr for LatLng {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| LocationError::InvalidInput(format!("expected 'lat,lng', got '{}'", s)))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| LocationError::InvalidInput(format!("invalid latitude '{}'", lat.trim())))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| LocationError::InvalidInput(format!("invalid longitude '{}'", lng.trim())))?;
        Ok(Self { lat, lng })
    }
}

/// Ordered waypoints from origin to destination. Empty means no route.
pub type Route = Vec<LatLng>;

/// A postal address.
///
/// Reverse geocoding fills only the street fields; forward geocoding uses
/// every non-empty field as the query text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street_name: String,
    #[serde(default)]
    pub street_no: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

impl Address {
    /// True when every field is blank, i.e. the address renders as `""`.
    pub fn is_empty(&self) -> bool {
        [&self.street_name, &self.street_no, &self.city, &self.country]
            .iter()
            .all(|f| f.trim().is_empty())
    }
}

/// Renders `"<street_name> <street_no>, <city>, <country>"`, skipping empty parts.
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let street = [self.street_name.trim(), self.street_no.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let parts: Vec<&str> = [street.as_str(), self.city.trim(), self.country.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Travel mode requested from the directions endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
            Self::Transit => "transit",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "driving" | "drive" => Ok(Self::Driving),
            "walking" | "walk" => Ok(Self::Walking),
            "bicycling" | "bike" => Ok(Self::Bicycling),
            "transit" => Ok(Self::Transit),
            _ => Err(LocationError::InvalidInput(format!(
                "unknown travel mode '{}'. Use driving, walking, bicycling or transit",
                s
            ))),
        }
    }
}

/// Failures of the provider layer and of user input at the outer surfaces.
///
/// Geometry and distance shaping never produce these.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
    #[error("No API key configured. Set GOOGLE_MAPS_API_KEY or google.api_key in the config file")]
    MissingApiKey,
    #[error("Invalid coordinates ({lat}, {lng}). Lat: -90..90, Lng: -180..180")]
    InvalidCoordinate { lat: f64, lng: f64 },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Background task failed: {0}")]
    Task(String),
}
