//! Directions between two points

use serde::{Deserialize, Serialize};
use std::fmt;

/// Travel mode understood by the directions endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human readable text plus the raw value (metres or seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub text: String,
    pub value: u64,
}

/// A single leg of a route from origin to destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance: Measure,
    pub duration: Measure,
    pub start_address: String,
    pub end_address: String,
    pub steps: Vec<RouteStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub instructions: String,
    pub distance: Measure,
    pub duration: Measure,
    /// Encoded polyline
    pub polyline: String,
    pub travel_mode: String,
}

impl RouteLeg {
    #[must_use]
    pub fn distance_km(&self) -> f64 {
        self.distance.value as f64 / 1000.0
    }

    #[must_use]
    pub fn duration_minutes(&self) -> f64 {
        self.duration.value as f64 / 60.0
    }
}
