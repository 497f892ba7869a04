//! Maps provider boundary
//!
//! [`PlacesGateway`] is the only way the rest of the crate talks to the
//! mapping provider. [`GoogleMapsClient`] speaks the Google Maps web
//! services and [`CachedGateway`] layers the on-disk response cache over
//! any gateway.

use async_trait::async_trait;

use crate::models::{Coordinate, Location, Place, PlaceSuggestion, RouteLeg, TravelMode};

pub mod cached;
pub mod error;
pub mod google;
pub mod middleware;
pub mod responses;
pub mod urls;

pub use cached::CachedGateway;
pub use error::{GatewayError, ProviderStatus};
pub use google::GoogleMapsClient;
pub use urls::{
    DEFAULT_PHOTO_MAX_WIDTH, DEFAULT_STATIC_MAP_HEIGHT, DEFAULT_STATIC_MAP_WIDTH, MapUrls,
};

/// Operations consumed from the mapping provider
#[async_trait]
pub trait PlacesGateway: Send + Sync {
    /// Resolve a free-form address; the location is named after the query
    async fn geocode(&self, address: &str) -> Result<Location, GatewayError>;

    /// Describe a coordinate. No match yields a coordinate-only location.
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Location, GatewayError>;

    /// Suggestions for partially typed input; blank input yields nothing
    async fn autocomplete(&self, input: &str) -> Result<Vec<PlaceSuggestion>, GatewayError>;

    async fn place_details(&self, place_id: &str) -> Result<Place, GatewayError>;

    /// Places within `radius_meters` of `location`, optionally of one type
    async fn nearby_search(
        &self,
        location: Coordinate,
        radius_meters: u32,
        place_type: Option<&str>,
    ) -> Result<Vec<Place>, GatewayError>;

    /// First leg of the first route between two points
    async fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
    ) -> Result<RouteLeg, GatewayError>;
}
