use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::location::{Address, LatLng, LocationError, LocationService};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

impl From<LocationError> for ApiError {
    fn from(e: LocationError) -> Self {
        let status = match e {
            LocationError::Network(_) | LocationError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            LocationError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
            LocationError::InvalidCoordinate { .. } | LocationError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            LocationError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, e.to_string())
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

fn service(state: &AppState) -> Result<LocationService, ApiError> {
    state.service.clone().ok_or_else(|| LocationError::MissingApiKey.into())
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

// ─── GET /health ─────────────────────────────────────────────────

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ─── GET /api/geocode ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GeocodeQuery {
    #[serde(default)]
    pub street_name: String,
    #[serde(default)]
    pub street_no: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

pub async fn geocode(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeQuery>,
) -> Result<Json<LatLng>, ApiError> {
    let start = Instant::now();
    let address = Address {
        street_name: params.street_name,
        street_no: params.street_no,
        city: params.city,
        country: params.country,
    };
    if address.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Provide at least one address field"));
    }

    let point = service(&state)?.geocode_async(address.clone()).await?;

    info!(%address, %point, ms = elapsed_ms(start), "GET /api/geocode");
    Ok(Json(point))
}

// ─── GET /api/reverse ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PointQuery {
    pub lat: f64,
    pub lng: f64,
}

pub async fn reverse_geocode(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PointQuery>,
) -> Result<Json<Address>, ApiError> {
    let start = Instant::now();
    let point = LatLng::new(params.lat, params.lng).validated()?;

    let address = service(&state)?.reverse_geocode_async(point).await?;

    info!(%point, found = address.is_some(), ms = elapsed_ms(start), "GET /api/reverse");
    address
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("No address found at {}", point)))
}

// ─── GET /api/route, GET /api/distance ───────────────────────────

#[derive(Deserialize)]
pub struct LegQuery {
    pub from_lat: f64,
    pub from_lng: f64,
    pub to_lat: f64,
    pub to_lng: f64,
}

impl LegQuery {
    fn endpoints(&self) -> Result<(LatLng, LatLng), LocationError> {
        Ok((
            LatLng::new(self.from_lat, self.from_lng).validated()?,
            LatLng::new(self.to_lat, self.to_lng).validated()?,
        ))
    }
}

pub async fn route(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LegQuery>,
) -> Result<Json<Vec<LatLng>>, ApiError> {
    let start = Instant::now();
    let (from, to) = params.endpoints()?;

    let route = service(&state)?.route_async(from, to).await?;

    info!(%from, %to, waypoints = route.len(), ms = elapsed_ms(start), "GET /api/route");
    Ok(Json(route))
}

#[derive(Serialize, Deserialize)]
pub struct DistanceResponse {
    pub meters: u32,
}

pub async fn distance(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LegQuery>,
) -> Result<Json<DistanceResponse>, ApiError> {
    let start = Instant::now();
    let (from, to) = params.endpoints()?;

    let meters = service(&state)?.distance_meters_async(from, to).await?;

    info!(%from, %to, meters, ms = elapsed_ms(start), "GET /api/distance");
    Ok(Json(DistanceResponse { meters }))
}

// ─── POST /api/geofence/contains ─────────────────────────────────

#[derive(Deserialize)]
pub struct ContainsRequest {
    pub point: LatLng,
    pub polygon: Vec<LatLng>,
}

#[derive(Serialize, Deserialize)]
pub struct ContainsResponse {
    pub inside: bool,
}

pub async fn geofence_contains(Json(req): Json<ContainsRequest>) -> Result<Json<ContainsResponse>, ApiError> {
    let point = req.point.validated()?;
    crate::location::check_fence(&req.polygon)?;
    let inside = crate::location::is_inside(point, &req.polygon);
    Ok(Json(ContainsResponse { inside }))
}
