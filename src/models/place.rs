//! Places returned by the maps provider and autocomplete suggestions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Coordinate;

/// Fallback name for provider results without one
pub const UNKNOWN_PLACE_NAME: &str = "Unknown Place";

/// A candidate meeting place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Opaque provider identifier
    pub place_id: String,
    pub name: String,
    /// `None` when the provider omitted geometry; such places are never ranked
    pub coordinate: Option<Coordinate>,
    pub address: Option<String>,
    pub vicinity: Option<String>,
    /// Average rating in `[0, 5]`, 0 when unrated
    pub rating: f64,
    pub user_ratings_total: u32,
    pub types: BTreeSet<String>,
    pub price_level: Option<u8>,
    pub opening_hours: Option<OpeningHours>,
    pub photos: Vec<PhotoReference>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub icon: Option<String>,
    /// Derived by ranking, never provider data
    pub distance_from_midpoint_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub open_now: Option<bool>,
    pub weekday_text: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoReference {
    pub reference: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub attributions: Vec<String>,
}

/// Autocomplete prediction the user can pick to resolve a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub place_id: String,
    pub description: String,
    pub main_text: Option<String>,
    pub secondary_text: Option<String>,
}

impl Place {
    /// Create a place with only the identifying fields set
    #[must_use]
    pub fn new(place_id: impl Into<String>, name: impl Into<String>, coordinate: Option<Coordinate>) -> Self {
        Self {
            place_id: place_id.into(),
            name: name.into(),
            coordinate,
            address: None,
            vicinity: None,
            rating: 0.0,
            user_ratings_total: 0,
            types: BTreeSet::new(),
            price_level: None,
            opening_hours: None,
            photos: Vec::new(),
            website: None,
            phone: None,
            icon: None,
            distance_from_midpoint_km: None,
        }
    }

    /// Clamp a provider rating into `[0, 5]`
    #[must_use]
    pub fn normalize_rating(rating: Option<f64>) -> f64 {
        rating
            .filter(|r| r.is_finite())
            .map_or(0.0, |r| r.clamp(0.0, 5.0))
    }

    /// First photo, used as the thumbnail
    #[must_use]
    pub fn primary_photo(&self) -> Option<&PhotoReference> {
        self.photos.first()
    }

    /// Address for display: formatted address, else vicinity
    #[must_use]
    pub fn display_address(&self) -> Option<&str> {
        self.address.as_deref().or(self.vicinity.as_deref())
    }

    #[must_use]
    pub fn has_type(&self, place_type: &str) -> bool {
        self.types.contains(place_type)
    }
}
