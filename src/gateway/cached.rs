//! Response cache layered over a [`PlacesGateway`]
//!
//! Geocoding, reverse geocoding, place details and directions are stable
//! enough to cache; autocomplete and nearby search always go to the
//! provider. Cache failures are logged and never fail the call.

use async_trait::async_trait;
use rand::RngExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{GatewayError, PlacesGateway};
use crate::cache::ResponseCache;
use crate::models::{Coordinate, Location, Place, PlaceSuggestion, RouteLeg, TravelMode};

/// Decimal places kept in coordinate cache keys (about 11 m)
const KEY_PRECISION: u32 = 4;

pub struct CachedGateway<G> {
    inner: G,
    cache: ResponseCache,
    ttl: Duration,
}

impl<G: PlacesGateway> CachedGateway<G> {
    #[must_use]
    pub fn new(inner: G, cache: ResponseCache, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    #[must_use]
    pub fn inner(&self) -> &G {
        &self.inner
    }

    async fn lookup<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Option<T> {
        match self.cache.get::<T>(key).await {
            Ok(hit) => {
                if hit.is_some() {
                    debug!("Cache hit for {}", key);
                }
                hit
            }
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn store<T: Serialize + Send + Debug + 'static>(&self, key: &str, value: T) {
        let jitter: f64 = rand::rng().random_range(0.9..1.1);
        let ttl = self.ttl.mul_f64(jitter);
        if let Err(e) = self.cache.put(key, value, ttl).await {
            warn!("Cache write failed for {}: {}", key, e);
        }
    }
}

fn coordinate_key(coordinate: Coordinate) -> String {
    let (lat, lon) = coordinate.rounded(KEY_PRECISION);
    format!("{lat},{lon}")
}

#[async_trait]
impl<G: PlacesGateway> PlacesGateway for CachedGateway<G> {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Location, GatewayError> {
        let key = format!("geocode:{}", address.trim().to_lowercase());
        if let Some(location) = self.lookup::<Location>(&key).await {
            // Named after the query as typed
            return Ok(location.with_name(address));
        }

        let location = self.inner.geocode(address).await?;
        self.store(&key, location.clone()).await;
        Ok(location)
    }

    #[instrument(skip(self), fields(coordinate = %coordinate))]
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Location, GatewayError> {
        let key = format!("reverse:{}", coordinate_key(coordinate));
        if let Some(mut location) = self.lookup::<Location>(&key).await {
            location.coordinate = coordinate;
            return Ok(location);
        }

        let location = self.inner.reverse_geocode(coordinate).await?;
        // Coordinate-only answers are not worth keeping
        if location.address.is_some() {
            self.store(&key, location.clone()).await;
        }
        Ok(location)
    }

    async fn autocomplete(&self, input: &str) -> Result<Vec<PlaceSuggestion>, GatewayError> {
        self.inner.autocomplete(input).await
    }

    #[instrument(skip(self))]
    async fn place_details(&self, place_id: &str) -> Result<Place, GatewayError> {
        let key = format!("details:{place_id}");
        if let Some(place) = self.lookup::<Place>(&key).await {
            return Ok(place);
        }

        let place = self.inner.place_details(place_id).await?;
        self.store(&key, place.clone()).await;
        Ok(place)
    }

    async fn nearby_search(
        &self,
        location: Coordinate,
        radius_meters: u32,
        place_type: Option<&str>,
    ) -> Result<Vec<Place>, GatewayError> {
        self.inner
            .nearby_search(location, radius_meters, place_type)
            .await
    }

    #[instrument(skip(self), fields(origin = %origin, destination = %destination))]
    async fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
    ) -> Result<RouteLeg, GatewayError> {
        let key = format!(
            "directions:{}-{}-{}",
            coordinate_key(origin),
            coordinate_key(destination),
            mode
        );
        if let Some(leg) = self.lookup::<RouteLeg>(&key).await {
            return Ok(leg);
        }

        let leg = self.inner.directions(origin, destination, mode).await?;
        self.store(&key, leg.clone()).await;
        Ok(leg)
    }
}
