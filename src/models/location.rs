//! Location model for a party's position and its metadata

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// A resolved position: geocoded address, reverse-geocoded coordinates or a
/// device fix.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    pub coordinate: Coordinate,
    /// Short human readable name ("Eiffel Tower", "Current Location")
    pub name: Option<String>,
    /// Full formatted address from the provider
    pub address: Option<String>,
    /// Whether this came from the device's own position
    pub is_current_location: bool,
}

impl Location {
    /// Create an unnamed location at the given coordinate
    #[must_use]
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            name: None,
            address: None,
            is_current_location: false,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn as_current_location(mut self) -> Self {
        self.is_current_location = true;
        self
    }

    /// Name, else address, else the formatted coordinates
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.address.clone())
            .unwrap_or_else(|| self.coordinate.to_string())
    }
}
