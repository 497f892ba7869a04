//! Validated geographic coordinates and great-circle distance

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Mean Earth radius used for every distance in this crate
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Reasons a latitude/longitude pair is rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("Latitude must be between -90 and 90, got: {0}")]
    LatitudeOutOfRange(f64),

    #[error("Longitude must be between -180 and 180, got: {0}")]
    LongitudeOutOfRange(f64),

    #[error("Coordinates must be finite numbers")]
    NotFinite,
}

/// A point on the Earth's surface in decimal degrees.
///
/// Values are checked on construction (and on deserialization), so every
/// `Coordinate` in circulation is within bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize, Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(coordinate: Coordinate) -> Self {
        Self {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        }
    }
}

impl Coordinate {
    /// Create a coordinate, rejecting out-of-range or non-finite values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build from values already known to be finite, clamping into range.
    /// Used for computed points whose trigonometry can overshoot by an ulp.
    #[must_use]
    pub(crate) fn clamped(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: latitude.clamp(-90.0, 90.0),
            longitude: longitude.clamp(-180.0, 180.0),
        }
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance in kilometres (haversine, R = 6371 km)
    #[must_use]
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine::distance(
            haversine::Location {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            haversine::Location {
                latitude: other.latitude,
                longitude: other.longitude,
            },
            haversine::Units::Kilometers,
        )
    }

    /// Format as the `lat,lng` pair the maps provider expects
    #[must_use]
    pub fn to_query_value(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(5));
        let lat = (self.latitude * multiplier).round() / multiplier;
        let lon = (self.longitude * multiplier).round() / multiplier;
        (lat, lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(91.0, 0.0)]
    #[case(-90.5, 10.0)]
    #[case(45.0, 180.1)]
    #[case(45.0, -181.0)]
    #[case(f64::NAN, 0.0)]
    #[case(0.0, f64::INFINITY)]
    fn test_rejects_invalid_coordinates(#[case] lat: f64, #[case] lon: f64) {
        assert!(Coordinate::new(lat, lon).is_err());
    }

    #[rstest]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(0.0, 0.0)]
    fn test_accepts_boundary_coordinates(#[case] lat: f64, #[case] lon: f64) {
        let coordinate = Coordinate::new(lat, lon).unwrap();
        assert_eq!(coordinate.latitude(), lat);
        assert_eq!(coordinate.longitude(), lon);
    }

    #[test]
    fn test_latitude_error_reports_value() {
        let err = Coordinate::new(123.0, 0.0).unwrap_err();
        assert_eq!(err, CoordinateError::LatitudeOutOfRange(123.0));
        assert!(err.to_string().contains("123"));
    }

    #[test]
    fn test_distance_one_degree_on_equator() {
        let a = Coordinate::new(0.0, 0.0).unwrap();
        let b = Coordinate::new(0.0, 1.0).unwrap();
        assert!((a.distance_km(&b) - 111.195).abs() < 0.01);
        assert_eq!(a.distance_km(&a), 0.0);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Coordinate = serde_json::from_str(r#"{"latitude": 46.8, "longitude": 8.2}"#).unwrap();
        assert_eq!(ok.latitude(), 46.8);

        let bad = serde_json::from_str::<Coordinate>(r#"{"latitude": 146.8, "longitude": 8.2}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_display_and_query_value() {
        let coordinate = Coordinate::new(46.818_234, 8.227_456).unwrap();
        assert_eq!(coordinate.to_string(), "46.8182, 8.2275");
        assert_eq!(coordinate.to_query_value(), "46.818234,8.227456");
        assert_eq!(coordinate.rounded(2), (46.82, 8.23));
    }
}
