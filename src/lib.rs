//! `halfway` - find a fair place to meet
//!
//! This library provides the geodesic midpoint and fairness calculation,
//! ranking of nearby places, the maps provider gateway and the session
//! state tying them together.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod geolocation;
pub mod logging;
pub mod midpoint;
pub mod models;
pub mod planner;
pub mod ranking;
pub mod session;
pub mod web;

// Re-export core types for public API
pub use config::HalfwayConfig;
pub use error::HalfwayError;
pub use gateway::{CachedGateway, GatewayError, GoogleMapsClient, PlacesGateway};
pub use midpoint::{FairnessLabel, FairnessThresholds, Midpoint, compute_midpoint};
pub use models::{Coordinate, Location, Place, PlaceSuggestion, RouteLeg, TravelMode};
pub use planner::{LocationQuery, MeetingPlan, MeetingPlanner};
pub use ranking::rank_places;
pub use session::{MeetingSession, Party};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, HalfwayError>;
