#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use halfway::gateway::{GatewayError, PlacesGateway};
use halfway::models::{Coordinate, Location, Place, PlaceSuggestion, RouteLeg, TravelMode};
use tokio::sync::Notify;

pub fn coord(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).unwrap()
}

pub fn place(id: &str, lat: f64, lon: f64, rating: f64) -> Place {
    let mut place = Place::new(id, format!("Place {id}"), Some(coord(lat, lon)));
    place.rating = rating;
    place
}

/// Blocks `nearby_search` until released
#[derive(Default)]
pub struct SearchGate {
    pub entered: Notify,
    pub release: Notify,
}

/// In-memory gateway with scripted answers
#[derive(Default)]
pub struct FakeGateway {
    pub addresses: HashMap<String, Location>,
    pub places: HashMap<String, Place>,
    pub nearby: Vec<Place>,
    pub nearby_error: Option<GatewayError>,
    pub reverse_error: Option<GatewayError>,
    pub gate: Option<Arc<SearchGate>>,
    pub nearby_calls: AtomicUsize,
    pub last_category: std::sync::Mutex<Option<String>>,
}

impl FakeGateway {
    pub fn with_address(mut self, address: &str, lat: f64, lon: f64) -> Self {
        let location = Location::new(coord(lat, lon))
            .with_name(address)
            .with_address(format!("{address}, Testland"));
        self.addresses.insert(address.to_string(), location);
        self
    }

    pub fn with_place(mut self, place: Place) -> Self {
        self.places.insert(place.place_id.clone(), place);
        self
    }

    pub fn with_nearby(mut self, places: Vec<Place>) -> Self {
        self.nearby = places;
        self
    }

    pub fn nearby_calls(&self) -> usize {
        self.nearby_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlacesGateway for FakeGateway {
    async fn geocode(&self, address: &str) -> Result<Location, GatewayError> {
        self.addresses.get(address).cloned().ok_or_else(|| {
            GatewayError::provider(format!("No results found for '{address}'"), Some("ZERO_RESULTS"))
        })
    }

    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Location, GatewayError> {
        if let Some(err) = &self.reverse_error {
            return Err(err.clone());
        }
        Ok(Location::new(coordinate)
            .with_name("Middle Street")
            .with_address("Middle Street, Testland"))
    }

    async fn autocomplete(&self, input: &str) -> Result<Vec<PlaceSuggestion>, GatewayError> {
        if input.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .addresses
            .keys()
            .filter(|address| address.starts_with(input))
            .map(|address| PlaceSuggestion {
                place_id: format!("id-{address}"),
                description: address.clone(),
                main_text: Some(address.clone()),
                secondary_text: None,
            })
            .collect())
    }

    async fn place_details(&self, place_id: &str) -> Result<Place, GatewayError> {
        self.places.get(place_id).cloned().ok_or_else(|| {
            GatewayError::from_status(
                halfway::gateway::ProviderStatus::InvalidRequest,
                "Failed to fetch place details: NOT_FOUND",
                Some("NOT_FOUND"),
            )
        })
    }

    async fn nearby_search(
        &self,
        _location: Coordinate,
        _radius_meters: u32,
        place_type: Option<&str>,
    ) -> Result<Vec<Place>, GatewayError> {
        self.nearby_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_category.lock().unwrap() = place_type.map(str::to_string);

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        match &self.nearby_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.nearby.clone()),
        }
    }

    async fn directions(
        &self,
        _origin: Coordinate,
        _destination: Coordinate,
        _mode: TravelMode,
    ) -> Result<RouteLeg, GatewayError> {
        Err(GatewayError::provider("No routes found", Some("ZERO_RESULTS")))
    }
}
