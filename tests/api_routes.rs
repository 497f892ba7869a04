mod common;

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use common::{FakeGateway, place};
use halfway::api::{AppState, HealthResponse, PlanResponse, UrlResponse};
use halfway::config::SearchConfig;
use halfway::gateway::MapUrls;
use halfway::midpoint::{FairnessLabel, FairnessThresholds, Midpoint};
use halfway::models::{Location, PlaceSuggestion};
use halfway::planner::MeetingPlanner;
use halfway::web;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_app_with(gateway: FakeGateway, api_key: Option<&str>) -> axum::Router {
    let planner = MeetingPlanner::new(
        Arc::new(gateway),
        SearchConfig::default(),
        FairnessThresholds::default(),
    );
    let state = AppState {
        planner: Arc::new(planner),
        urls: MapUrls::new("https://maps.example.com/maps/api", api_key.map(str::to_string)),
    };
    web::app(state)
}

fn test_app() -> axum::Router {
    let gateway = FakeGateway::default()
        .with_address("New York", 40.7128, -74.0060)
        .with_address("Los Angeles", 34.0522, -118.2437)
        .with_nearby(vec![place("diner", 39.6, -97.0, 4.5), place("motel", 39.5, -97.2, 3.0)]);
    test_app_with(gateway, Some("test-key-123"))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn send<T: DeserializeOwned>(app: &axum::Router, request: Request<Body>) -> (StatusCode, T) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_version() {
    let (status, body): (_, HealthResponse) = send(&test_app(), get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, "ok");
    assert_eq!(body.version, halfway::VERSION);
}

#[tokio::test]
async fn midpoint_between_new_york_and_los_angeles() {
    let payload = json!({
        "a": {"latitude": 40.7128, "longitude": -74.0060},
        "b": {"latitude": 34.0522, "longitude": -118.2437}
    });
    let (status, midpoint): (_, Midpoint) = send(&test_app(), post("/api/midpoint", payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert!((midpoint.coordinate().latitude() - 39.1).abs() < 0.6);
    assert!((midpoint.coordinate().longitude() - -97.5).abs() < 0.6);
    assert!(midpoint.fairness_delta_km < 0.01);
    assert_eq!(midpoint.fairness, FairnessLabel::VeryFair);
}

#[tokio::test]
async fn midpoint_rejects_out_of_range_coordinates() {
    let payload = json!({
        "a": {"latitude": 91.0, "longitude": 0.0},
        "b": {"latitude": 0.0, "longitude": 0.0}
    });
    let (status, body): (_, Value) = send(&test_app(), post("/api/midpoint", payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
    assert!(body["error"].as_str().unwrap().contains("Latitude must be between -90 and 90"));
    assert!(body["provider_status"].is_null());
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() {
    let app = test_app();

    let payload = json!({
        "origin": {"latitude": 0.0, "longitude": 0.0},
        "destination": {"latitude": 1.0, "longitude": 181.0}
    });
    let (status, body): (_, Value) = send(&app, post("/api/directions", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
    assert!(body["error"].as_str().unwrap().contains("Longitude"));

    let request = Request::builder()
        .method("POST")
        .uri("/api/plan")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body): (_, Value) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn plan_resolves_and_ranks() {
    let payload = json!({"a": "New York", "b": "Los Angeles", "category": "restaurant"});
    let (status, plan): (_, PlanResponse) = send(&test_app(), post("/api/plan", payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan.location_a.name.as_deref(), Some("New York"));
    assert_eq!(plan.midpoint.location.name.as_deref(), Some("Middle Street"));
    assert_eq!(plan.places.len(), 2);
    assert!(plan.places[0].distance_from_midpoint_km <= plan.places[1].distance_from_midpoint_km);
    let map = plan.static_map_url.unwrap();
    assert!(map.contains("label%3AM"));
    assert!(map.ends_with("key=test-key-123"));
}

#[tokio::test]
async fn plan_with_unknown_address_returns_provider_error() {
    let payload = json!({"a": "New York", "b": "Atlantis"});
    let (status, body): (_, Value) = send(&test_app(), post("/api/plan", payload)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "provider_error");
    assert_eq!(body["provider_status"], "ZERO_RESULTS");
    assert_eq!(body["error"], "No results found for 'Atlantis'");
}

#[tokio::test]
async fn plan_with_blank_input_is_rejected() {
    let payload = json!({"a": "  ", "b": "Los Angeles"});
    let (status, body): (_, Value) = send(&test_app(), post("/api/plan", payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn autocomplete_and_geocode() {
    let app = test_app();

    let (status, suggestions): (_, Vec<PlaceSuggestion>) =
        send(&app, get("/api/autocomplete?input=New")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].description, "New York");

    let (status, location): (_, Location) = send(&app, get("/api/geocode?address=Los%20Angeles")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(location.address.as_deref(), Some("Los Angeles, Testland"));
}

#[tokio::test]
async fn reverse_geocode_validates_coordinates() {
    let app = test_app();

    let (status, location): (_, Location) =
        send(&app, get("/api/reverse-geocode?lat=40.0&lng=-97.0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(location.name.as_deref(), Some("Middle Street"));

    let (status, body): (_, Value) = send(&app, get("/api/reverse-geocode?lat=40.0&lng=200.0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_coordinate");
}

#[tokio::test]
async fn unknown_place_and_missing_route() {
    let app = test_app();

    let (status, body): (_, Value) = send(&app, get("/api/places/nope")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["provider_status"], "NOT_FOUND");

    let payload = json!({
        "origin": {"latitude": 0.0, "longitude": 0.0},
        "destination": {"latitude": 1.0, "longitude": 1.0},
        "mode": "walking"
    });
    let (status, body): (_, Value) = send(&app, post("/api/directions", payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No routes found");
}

#[tokio::test]
async fn photo_url_needs_api_key() {
    let (status, body): (_, UrlResponse) =
        send(&test_app(), get("/api/photo-url?reference=abc&max_width=200")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.url.contains("maxwidth=200&photoreference=abc"));

    let keyless = test_app_with(FakeGateway::default(), None);
    let (status, body): (_, Value) = send(&keyless, get("/api/photo-url?reference=abc")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "missing_api_key");
}
