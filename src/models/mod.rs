//! Data models for the halfway application
//!
//! This module contains the core domain models organized by concern:
//! - Coordinate: validated latitude/longitude and great-circle distance
//! - Location: a party's resolved position
//! - Place: candidate meeting places and autocomplete suggestions
//! - Route: directions legs and travel modes

pub mod coordinate;
pub mod location;
pub mod place;
pub mod route;

// Re-export all public types for convenient access
pub use coordinate::{Coordinate, CoordinateError, EARTH_RADIUS_KM};
pub use location::Location;
pub use place::{OpeningHours, PhotoReference, Place, PlaceSuggestion, UNKNOWN_PLACE_NAME};
pub use route::{Measure, RouteLeg, RouteStep, TravelMode};
