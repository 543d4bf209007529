//! Turns decoded provider payloads into coordinates, addresses, routes and
//! distances.
//!
//! Nothing here fails: a payload that doesn't carry what was asked for
//! shapes into the operation's sentinel (zero coordinate, `None`, empty
//! route, `0`).

use super::dto::{DirectionsResponse, GeocodingResponse, Leg};
use super::types::{Address, LatLng, Route};

/// Meters per statute mile.
pub const METERS_PER_MILE: f64 = 1609.34;

fn status_ok(status: &str) -> bool {
    status.eq_ignore_ascii_case("ok")
}

/// First leg of the first route, if the response is usable at all.
fn first_leg(response: &DirectionsResponse) -> Option<&Leg> {
    if !status_ok(&response.status) {
        return None;
    }
    response.routes.first()?.legs.first()
}

/// Step end coordinates of the first leg, in traversal order.
pub fn route_from_directions(response: &DirectionsResponse) -> Route {
    match first_leg(response) {
        Some(leg) => leg.steps.iter().map(|s| s.end_location).collect(),
        None => Vec::new(),
    }
}

/// Length of the first leg in whole meters.
///
/// Uses the numeric `distance.value` when the provider sent one and falls
/// back to parsing `distance.text`.
pub fn distance_from_directions(response: &DirectionsResponse) -> u32 {
    let Some(distance) = first_leg(response).and_then(|leg| leg.distance.as_ref()) else {
        return 0;
    };
    match distance.value {
        Some(meters) => u32::try_from(meters).unwrap_or(u32::MAX),
        None => parse_distance_meters(&distance.text),
    }
}

/// Location of the first result that has a geometry, or `(0, 0)`.
pub fn location_from_geocoding(response: &GeocodingResponse) -> LatLng {
    if !status_ok(&response.status) {
        return LatLng::default();
    }
    response
        .results
        .iter()
        .find_map(|r| r.geometry.as_ref().map(|g| g.location))
        .unwrap_or_default()
}

/// Street name and number from a reverse-geocoding response.
pub fn address_from_geocoding(response: &GeocodingResponse) -> Option<Address> {
    if !status_ok(&response.status) {
        return None;
    }
    Some(Address {
        street_name: address_component(response, "route"),
        street_no: address_component(response, "street_number"),
        ..Default::default()
    })
}

/// Long name of the first component of type `kind` across all results.
fn address_component(response: &GeocodingResponse, kind: &str) -> String {
    response
        .results
        .iter()
        .flat_map(|r| r.address_components.iter())
        .find(|c| c.types.iter().any(|t| t.eq_ignore_ascii_case(kind)))
        .map(|c| c.long_name.clone())
        .unwrap_or_default()
}

/// A distance string as parsed, before unit conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum DistanceText {
    Parsed { value: f64, unit: String },
    Unparsed,
}

impl DistanceText {
    /// Parses `"<number> <unit>"`.
    ///
    /// The number uses invariant formatting: ASCII digits with at most one
    /// `.`, no sign, exponent or group separators.
    pub fn parse(text: &str) -> Self {
        let parts: Vec<&str> = text.split_whitespace().collect();
        let [number, unit] = parts.as_slice() else {
            return Self::Unparsed;
        };
        if !is_invariant_decimal(number) {
            return Self::Unparsed;
        }
        match number.parse::<f64>() {
            Ok(value) => Self::Parsed {
                value,
                unit: unit.to_string(),
            },
            Err(_) => Self::Unparsed,
        }
    }

    /// Whole meters, rounded up, treating the value as miles. `0` when unparsed.
    pub fn meters(&self) -> u32 {
        match self {
            Self::Parsed { value, .. } => (METERS_PER_MILE * value).ceil() as u32,
            Self::Unparsed => 0,
        }
    }
}

fn is_invariant_decimal(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
        && s.chars().filter(|&c| c == '.').count() <= 1
}

/// Meters for a distance text such as `"5.5 mi"`; `0` if it can't be read.
pub fn parse_distance_meters(text: &str) -> u32 {
    DistanceText::parse(text).meters()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DIRECTIONS_OK: &str = r#"{
        "geocoded_waypoints": [{ "geocoder_status": "OK", "place_id": "abc" }],
        "routes": [{
            "summary": "E4",
            "copyrights": "Map data",
            "legs": [{
                "distance": { "text": "5.5 mi", "value": 8851 },
                "duration": { "text": "12 mins", "value": 720 },
                "start_address": "A",
                "end_address": "B",
                "start_location": { "lat": 59.0, "lng": 18.0 },
                "end_location": { "lat": 59.2, "lng": 18.3 },
                "steps": [
                    { "end_location": { "lat": 59.05, "lng": 18.1 }, "travel_mode": "DRIVING" },
                    { "end_location": { "lat": 59.1, "lng": 18.2 }, "travel_mode": "DRIVING" },
                    { "end_location": { "lat": 59.2, "lng": 18.3 }, "travel_mode": "DRIVING" }
                ]
            }]
        }],
        "status": "OK"
    }"#;

    const GEOCODE_OK: &str = r#"{
        "results": [{
            "address_components": [
                { "long_name": "12", "short_name": "12", "types": ["street_number"] },
                { "long_name": "Drottninggatan", "short_name": "Drottninggatan", "types": ["route"] },
                { "long_name": "Stockholm", "short_name": "Stockholm", "types": ["locality", "political"] }
            ],
            "formatted_address": "Drottninggatan 12, Stockholm, Sweden",
            "geometry": {
                "location": { "lat": 59.3326, "lng": 18.0649 },
                "location_type": "ROOFTOP",
                "viewport": {
                    "northeast": { "lat": 59.334, "lng": 18.066 },
                    "southwest": { "lat": 59.331, "lng": 18.063 }
                }
            },
            "place_id": "xyz",
            "types": ["street_address"]
        }],
        "status": "OK"
    }"#;

    fn directions(json: &str) -> DirectionsResponse {
        serde_json::from_str(json).unwrap()
    }

    fn geocoding(json: &str) -> GeocodingResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_route_from_steps() {
        let route = route_from_directions(&directions(DIRECTIONS_OK));
        assert_eq!(
            route,
            vec![
                LatLng::new(59.05, 18.1),
                LatLng::new(59.1, 18.2),
                LatLng::new(59.2, 18.3),
            ]
        );
    }

    #[test]
    fn test_route_non_ok_status() {
        let mut resp = directions(DIRECTIONS_OK);
        resp.status = "ZERO_RESULTS".into();
        assert!(route_from_directions(&resp).is_empty());
        assert_eq!(distance_from_directions(&resp), 0);
    }

    #[test]
    fn test_route_status_case_insensitive() {
        let mut resp = directions(DIRECTIONS_OK);
        resp.status = "ok".into();
        assert_eq!(route_from_directions(&resp).len(), 3);
    }

    #[test]
    fn test_route_zero_legs() {
        let resp = directions(r#"{ "routes": [{ "legs": [] }], "status": "OK" }"#);
        assert!(route_from_directions(&resp).is_empty());
        assert_eq!(distance_from_directions(&resp), 0);
    }

    #[test]
    fn test_route_no_routes() {
        let resp = directions(r#"{ "routes": [], "status": "OK" }"#);
        assert!(route_from_directions(&resp).is_empty());
    }

    #[test]
    fn test_route_leg_without_steps() {
        let resp = directions(r#"{ "routes": [{ "legs": [{ "distance": { "text": "1 mi" } }] }], "status": "OK" }"#);
        assert!(route_from_directions(&resp).is_empty());
        assert_eq!(distance_from_directions(&resp), 1610);
    }

    #[test]
    fn test_step_without_end_location_is_rejected() {
        let json = r#"{
            "routes": [{ "legs": [{ "steps": [
                { "travel_mode": "DRIVING" },
                { "end_location": { "lat": 1, "lng": 2 } }
            ] }] }],
            "status": "OK"
        }"#;
        let err = serde_json::from_str::<DirectionsResponse>(json).unwrap_err();
        assert!(err.to_string().contains("end_location"));
    }

    #[test]
    fn test_distance_prefers_numeric_value() {
        assert_eq!(distance_from_directions(&directions(DIRECTIONS_OK)), 8851);
    }

    #[test]
    fn test_distance_text_fallback() {
        let resp = directions(r#"{ "routes": [{ "legs": [{ "distance": { "text": "5.5 mi" } }] }], "status": "OK" }"#);
        assert_eq!(distance_from_directions(&resp), 8852);
    }

    #[test]
    fn test_parse_distance_miles() {
        assert_eq!(parse_distance_meters("5.5 mi"), 8852);
        assert_eq!(parse_distance_meters("1 mi"), 1610);
        assert_eq!(parse_distance_meters("0 mi"), 0);
        assert_eq!(parse_distance_meters(".5 mi"), 805);
    }

    #[test]
    fn test_parse_distance_rejects() {
        assert_eq!(parse_distance_meters("abc"), 0);
        assert_eq!(parse_distance_meters(""), 0);
        assert_eq!(parse_distance_meters("5.5"), 0);
        assert_eq!(parse_distance_meters("5.5 mi extra"), 0);
        assert_eq!(parse_distance_meters("-5 mi"), 0);
        assert_eq!(parse_distance_meters("1e3 mi"), 0);
        assert_eq!(parse_distance_meters("1,200 mi"), 0);
        assert_eq!(parse_distance_meters("1.2.3 mi"), 0);
        assert_eq!(parse_distance_meters(". mi"), 0);
    }

    #[test]
    fn test_distance_text_lossless() {
        match DistanceText::parse("12.25 km") {
            DistanceText::Parsed { value, unit } => {
                assert_relative_eq!(value, 12.25);
                assert_eq!(unit, "km");
            }
            DistanceText::Unparsed => panic!("expected parsed distance"),
        }
        assert_eq!(DistanceText::parse("far"), DistanceText::Unparsed);
    }

    #[test]
    fn test_location_from_geocoding() {
        let loc = location_from_geocoding(&geocoding(GEOCODE_OK));
        assert_relative_eq!(loc.lat, 59.3326);
        assert_relative_eq!(loc.lng, 18.0649);
    }

    #[test]
    fn test_location_skips_results_without_geometry() {
        let resp = geocoding(
            r#"{ "results": [{ "formatted_address": "x" }, { "geometry": { "location": { "lat": 1.0, "lng": 2.0 } } }], "status": "OK" }"#,
        );
        assert_eq!(location_from_geocoding(&resp), LatLng::new(1.0, 2.0));
    }

    #[test]
    fn test_location_no_match_is_origin() {
        let resp = geocoding(r#"{ "results": [], "status": "ZERO_RESULTS" }"#);
        assert_eq!(location_from_geocoding(&resp), LatLng::default());
        let resp = geocoding(r#"{ "results": [], "status": "OK" }"#);
        assert_eq!(location_from_geocoding(&resp), LatLng::default());
    }

    #[test]
    fn test_address_from_geocoding() {
        let addr = address_from_geocoding(&geocoding(GEOCODE_OK)).unwrap();
        assert_eq!(addr.street_name, "Drottninggatan");
        assert_eq!(addr.street_no, "12");
        assert!(addr.city.is_empty());
    }

    #[test]
    fn test_address_not_ok_is_none() {
        let resp = geocoding(r#"{ "status": "REQUEST_DENIED", "error_message": "bad key" }"#);
        assert!(address_from_geocoding(&resp).is_none());
    }

    #[test]
    fn test_address_ok_without_components_is_empty() {
        let resp = geocoding(r#"{ "results": [], "status": "OK" }"#);
        let addr = address_from_geocoding(&resp).unwrap();
        assert!(addr.is_empty());
    }
}
