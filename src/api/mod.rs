use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::gateway::{
    DEFAULT_PHOTO_MAX_WIDTH, DEFAULT_STATIC_MAP_HEIGHT, DEFAULT_STATIC_MAP_WIDTH, MapUrls,
};
use crate::midpoint::{Midpoint, compute_midpoint_with};
use crate::models::{Coordinate, Location, Place, PlaceSuggestion, RouteLeg, TravelMode};
use crate::planner::{LocationQuery, MeetingPlanner};

mod error;

pub use error::ApiError;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<MeetingPlanner>,
    pub urls: MapUrls,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MidpointRequest {
    pub a: Coordinate,
    pub b: Coordinate,
}

/// Both parties as typed: an address, "lat,lng" or "place_id:<id>"
#[derive(Debug, Serialize, Deserialize)]
pub struct PlanRequest {
    pub a: String,
    pub b: String,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanResponse {
    pub location_a: Location,
    pub location_b: Location,
    pub midpoint: Midpoint,
    pub places: Vec<Place>,
    /// Overview map with both parties and the midpoint
    pub static_map_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteParams {
    pub input: String,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct ReverseGeocodeParams {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DirectionsRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    #[serde(default)]
    pub mode: TravelMode,
}

#[derive(Debug, Deserialize)]
pub struct PhotoParams {
    pub reference: String,
    pub max_width: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UrlResponse {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/midpoint", post(midpoint))
        .route("/plan", post(plan))
        .route("/autocomplete", get(autocomplete))
        .route("/geocode", get(geocode))
        .route("/reverse-geocode", get(reverse_geocode))
        .route("/places/{id}", get(place_details))
        .route("/directions", post(directions))
        .route("/photo-url", get(photo_url))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

async fn midpoint(
    State(state): State<AppState>,
    payload: Result<Json<MidpointRequest>, JsonRejection>,
) -> ApiResult<Midpoint> {
    let Json(request) = payload.map_err(ApiError::rejected)?;
    Ok(Json(compute_midpoint_with(
        request.a,
        request.b,
        state.planner.thresholds(),
    )))
}

async fn plan(
    State(state): State<AppState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> ApiResult<PlanResponse> {
    let Json(request) = payload.map_err(ApiError::rejected)?;
    let query_a = LocationQuery::parse(&request.a)
        .ok_or_else(|| ApiError::invalid_input("Location A is empty"))?;
    let query_b = LocationQuery::parse(&request.b)
        .ok_or_else(|| ApiError::invalid_input("Location B is empty"))?;

    let (location_a, location_b) = state.planner.resolve_both(&query_a, &query_b).await;
    let (location_a, location_b) = (location_a?, location_b?);

    let plan = state
        .planner
        .plan(&location_a, &location_b, request.category.as_deref())
        .await?;

    let static_map_url = state
        .urls
        .static_map_url(
            location_a.coordinate,
            location_b.coordinate,
            plan.midpoint.coordinate(),
            DEFAULT_STATIC_MAP_WIDTH,
            DEFAULT_STATIC_MAP_HEIGHT,
        )
        .ok();

    Ok(Json(PlanResponse {
        location_a,
        location_b,
        midpoint: plan.midpoint,
        places: plan.places,
        static_map_url,
    }))
}

async fn autocomplete(
    State(state): State<AppState>,
    Query(params): Query<AutocompleteParams>,
) -> ApiResult<Vec<PlaceSuggestion>> {
    let suggestions = state.planner.gateway().autocomplete(&params.input).await?;
    Ok(Json(suggestions))
}

async fn geocode(
    State(state): State<AppState>,
    Query(params): Query<GeocodeParams>,
) -> ApiResult<Location> {
    if params.address.trim().is_empty() {
        return Err(ApiError::invalid_input("Address is empty"));
    }
    let location = state.planner.gateway().geocode(params.address.trim()).await?;
    Ok(Json(location))
}

async fn reverse_geocode(
    State(state): State<AppState>,
    Query(params): Query<ReverseGeocodeParams>,
) -> ApiResult<Location> {
    let coordinate = Coordinate::new(params.lat, params.lng)?;
    let location = state.planner.gateway().reverse_geocode(coordinate).await?;
    Ok(Json(location))
}

async fn place_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Place> {
    let place = state.planner.gateway().place_details(&id).await?;
    Ok(Json(place))
}

async fn directions(
    State(state): State<AppState>,
    payload: Result<Json<DirectionsRequest>, JsonRejection>,
) -> ApiResult<RouteLeg> {
    let Json(request) = payload.map_err(ApiError::rejected)?;
    let leg = state
        .planner
        .gateway()
        .directions(request.origin, request.destination, request.mode)
        .await?;
    Ok(Json(leg))
}

async fn photo_url(
    State(state): State<AppState>,
    Query(params): Query<PhotoParams>,
) -> ApiResult<UrlResponse> {
    let url = state.urls.photo_url(
        &params.reference,
        params.max_width.unwrap_or(DEFAULT_PHOTO_MAX_WIDTH),
    )?;
    Ok(Json(UrlResponse { url }))
}
