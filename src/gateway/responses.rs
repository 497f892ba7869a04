//! Google Maps web service response structures and conversion utilities

use serde::Deserialize;
use std::collections::BTreeSet;

use crate::models::{
    Coordinate, Location, Measure, OpeningHours, PhotoReference, Place, PlaceSuggestion, RouteLeg,
    RouteStep, UNKNOWN_PLACE_NAME,
};

/// Envelope fields shared by every endpoint
pub trait ProviderReply {
    fn status(&self) -> &str;
    fn error_message(&self) -> Option<&str>;
}

macro_rules! provider_reply {
    ($($response:ty),+ $(,)?) => {
        $(
            impl ProviderReply for $response {
                fn status(&self) -> &str {
                    &self.status
                }

                fn error_message(&self) -> Option<&str> {
                    self.error_message.as_deref()
                }
            }
        )+
    };
}

provider_reply!(
    GeocodingResponse,
    AutocompleteResponse,
    PlaceDetailsResponse,
    NearbySearchResponse,
    DirectionsResponse,
);

#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    #[serde(default)]
    pub results: Vec<GeocodingResult>,
    pub status: String,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResult {
    #[serde(default)]
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
    pub place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    pub status: String,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Prediction {
    pub description: String,
    pub place_id: String,
    pub structured_formatting: Option<StructuredFormatting>,
}

#[derive(Debug, Deserialize)]
pub struct StructuredFormatting {
    pub main_text: Option<String>,
    pub secondary_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceDetailsResponse {
    pub result: Option<PlaceResult>,
    pub status: String,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NearbySearchResponse {
    #[serde(default)]
    pub results: Vec<PlaceResult>,
    pub status: String,
    pub error_message: Option<String>,
}

/// Raw place as returned by details and nearby search
#[derive(Debug, Deserialize)]
pub struct PlaceResult {
    pub place_id: Option<String>,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub vicinity: Option<String>,
    pub geometry: Option<Geometry>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub types: Vec<String>,
    pub price_level: Option<u8>,
    pub opening_hours: Option<OpeningHoursResult>,
    #[serde(default)]
    pub photos: Vec<PhotoResult>,
    pub website: Option<String>,
    pub international_phone_number: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpeningHoursResult {
    pub open_now: Option<bool>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PhotoResult {
    pub photo_reference: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub html_attributions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub routes: Vec<RouteResult>,
    pub status: String,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RouteResult {
    #[serde(default)]
    pub legs: Vec<LegResult>,
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TextValue {
    pub text: String,
    pub value: u64,
}

#[derive(Debug, Deserialize)]
pub struct LegResult {
    pub distance: TextValue,
    pub duration: TextValue,
    #[serde(default)]
    pub start_address: String,
    #[serde(default)]
    pub end_address: String,
    #[serde(default)]
    pub steps: Vec<StepResult>,
}

#[derive(Debug, Deserialize)]
pub struct StepResult {
    #[serde(default)]
    pub html_instructions: String,
    pub distance: TextValue,
    pub duration: TextValue,
    pub polyline: Option<Polyline>,
    #[serde(default)]
    pub travel_mode: String,
}

#[derive(Debug, Deserialize)]
pub struct Polyline {
    pub points: String,
}

impl Geometry {
    fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::new(self.location.lat, self.location.lng).ok()
    }
}

impl GeocodingResult {
    /// Location for a forward geocode: named after the query
    pub fn into_location(self, query: &str) -> Option<Location> {
        let coordinate = self.geometry.coordinate()?;
        let mut location = Location::new(coordinate).with_name(query);
        location.address = self.formatted_address;
        Some(location)
    }

    /// Location for a reverse geocode: named after the first address segment.
    /// Without an address only the coordinate is kept.
    pub fn into_reverse_location(self, coordinate: Coordinate) -> Location {
        let Some(address) = self.formatted_address.filter(|a| !a.trim().is_empty()) else {
            return Location::new(coordinate);
        };
        let name = address.split(',').next().map(str::trim).unwrap_or_default().to_string();
        Location::new(coordinate).with_name(name).with_address(address)
    }
}

impl From<Prediction> for PlaceSuggestion {
    fn from(prediction: Prediction) -> Self {
        let (main_text, secondary_text) = prediction
            .structured_formatting
            .map(|f| (f.main_text, f.secondary_text))
            .unwrap_or_default();
        Self {
            place_id: prediction.place_id,
            description: prediction.description,
            main_text,
            secondary_text,
        }
    }
}

impl PlaceResult {
    /// Convert into a [`Place`], using `fallback_id` when the provider
    /// omitted the id. Returns `None` when no id is available at all.
    pub fn into_place(self, fallback_id: Option<&str>) -> Option<Place> {
        let place_id = self.place_id.or_else(|| fallback_id.map(str::to_string))?;

        Some(Place {
            place_id,
            name: self.name.unwrap_or_else(|| UNKNOWN_PLACE_NAME.to_string()),
            coordinate: self.geometry.as_ref().and_then(Geometry::coordinate),
            address: self.formatted_address.or_else(|| self.vicinity.clone()),
            vicinity: self.vicinity,
            rating: Place::normalize_rating(self.rating),
            user_ratings_total: self.user_ratings_total.unwrap_or(0),
            types: self.types.into_iter().collect::<BTreeSet<_>>(),
            price_level: self.price_level,
            opening_hours: self.opening_hours.map(|hours| OpeningHours {
                open_now: hours.open_now,
                weekday_text: hours.weekday_text,
            }),
            photos: self
                .photos
                .into_iter()
                .map(|photo| PhotoReference {
                    reference: photo.photo_reference,
                    width: photo.width,
                    height: photo.height,
                    attributions: photo.html_attributions,
                })
                .collect(),
            website: self.website,
            phone: self.international_phone_number,
            icon: self.icon,
            distance_from_midpoint_km: None,
        })
    }
}

impl From<TextValue> for Measure {
    fn from(value: TextValue) -> Self {
        Self {
            text: value.text,
            value: value.value,
        }
    }
}

impl From<LegResult> for RouteLeg {
    fn from(leg: LegResult) -> Self {
        Self {
            distance: leg.distance.into(),
            duration: leg.duration.into(),
            start_address: leg.start_address,
            end_address: leg.end_address,
            steps: leg
                .steps
                .into_iter()
                .map(|step| RouteStep {
                    instructions: step.html_instructions,
                    distance: step.distance.into(),
                    duration: step.duration.into(),
                    polyline: step.polyline.map(|p| p.points).unwrap_or_default(),
                    travel_mode: step.travel_mode,
                })
                .collect(),
        }
    }
}

impl DirectionsResponse {
    /// First leg of the first route
    pub fn into_first_leg(self) -> Option<RouteLeg> {
        self.routes
            .into_iter()
            .next()
            .and_then(|route| route.legs.into_iter().next())
            .map(RouteLeg::from)
    }
}
