//! Device position boundary and the "current location" lookup

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::gateway::PlacesGateway;
use crate::models::{Coordinate, Location};

pub const CURRENT_LOCATION_NAME: &str = "Current Location";
pub const ADDRESS_NOT_FOUND: &str = "Address not found";

/// Position request options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the device may return
    pub maximum_age: Duration,
}

impl Default for GeoOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(15),
            maximum_age: Duration::from_secs(10),
        }
    }
}

/// A position reported by the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceFix {
    pub coordinate: Coordinate,
    pub accuracy_meters: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),

    #[error("Timed out waiting for a location fix")]
    Timeout,
}

impl LocationError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            LocationError::PermissionDenied => {
                "Location access was denied. Please enable location permissions or enter an address."
                    .to_string()
            }
            LocationError::Unavailable(_) => {
                "Your location could not be determined. Please enter an address.".to_string()
            }
            LocationError::Timeout => {
                "Finding your location took too long. Please try again.".to_string()
            }
        }
    }
}

/// Source of device positions
#[async_trait]
pub trait DeviceLocator: Send + Sync {
    /// Ask for permission; `Ok(false)` means the user declined
    async fn request_permission(&self) -> Result<bool, LocationError>;

    async fn current_position(&self, options: &GeoOptions) -> Result<DeviceFix, LocationError>;
}

/// Resolve the device position into a named [`Location`].
///
/// Permission and positioning failures are returned. A failed reverse
/// geocode is not: the fix is still returned, named "Current Location"
/// with "Address not found".
#[instrument(skip(locator, gateway))]
pub async fn current_location(
    locator: &dyn DeviceLocator,
    gateway: &dyn PlacesGateway,
    options: &GeoOptions,
) -> Result<Location, LocationError> {
    if !locator.request_permission().await? {
        return Err(LocationError::PermissionDenied);
    }

    let fix = tokio::time::timeout(options.timeout, locator.current_position(options))
        .await
        .map_err(|_| LocationError::Timeout)??;

    info!(
        "Device fix at {} (accuracy {:?}m)",
        fix.coordinate, fix.accuracy_meters
    );

    let location = match gateway.reverse_geocode(fix.coordinate).await {
        Ok(location) => Location {
            coordinate: fix.coordinate,
            name: Some(location.name.unwrap_or_else(|| CURRENT_LOCATION_NAME.to_string())),
            address: Some(location.address.unwrap_or_else(|| ADDRESS_NOT_FOUND.to_string())),
            is_current_location: true,
        },
        Err(e) => {
            warn!("Could not name current location: {}", e);
            Location::new(fix.coordinate)
                .with_name(CURRENT_LOCATION_NAME)
                .with_address(ADDRESS_NOT_FOUND)
                .as_current_location()
        }
    };

    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use crate::models::{Place, PlaceSuggestion, RouteLeg, TravelMode};

    struct FixedLocator {
        permission: bool,
        fix: Result<DeviceFix, LocationError>,
        delay: Duration,
    }

    impl FixedLocator {
        fn at(lat: f64, lon: f64) -> Self {
            Self {
                permission: true,
                fix: Ok(DeviceFix {
                    coordinate: Coordinate::new(lat, lon).unwrap(),
                    accuracy_meters: Some(12.0),
                    timestamp: Utc::now(),
                }),
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl DeviceLocator for FixedLocator {
        async fn request_permission(&self) -> Result<bool, LocationError> {
            Ok(self.permission)
        }

        async fn current_position(&self, _options: &GeoOptions) -> Result<DeviceFix, LocationError> {
            tokio::time::sleep(self.delay).await;
            self.fix.clone()
        }
    }

    struct ReverseOnly(Result<Location, GatewayError>);

    #[async_trait]
    impl PlacesGateway for ReverseOnly {
        async fn geocode(&self, _address: &str) -> Result<Location, GatewayError> {
            Err(GatewayError::MissingApiKey)
        }

        async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Location, GatewayError> {
            self.0.clone().map(|location| Location { coordinate, ..location })
        }

        async fn autocomplete(&self, _input: &str) -> Result<Vec<PlaceSuggestion>, GatewayError> {
            Ok(Vec::new())
        }

        async fn place_details(&self, _place_id: &str) -> Result<Place, GatewayError> {
            Err(GatewayError::MissingApiKey)
        }

        async fn nearby_search(
            &self,
            _location: Coordinate,
            _radius_meters: u32,
            _place_type: Option<&str>,
        ) -> Result<Vec<Place>, GatewayError> {
            Ok(Vec::new())
        }

        async fn directions(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
            _mode: TravelMode,
        ) -> Result<RouteLeg, GatewayError> {
            Err(GatewayError::MissingApiKey)
        }
    }

    #[tokio::test]
    async fn test_named_current_location() {
        let locator = FixedLocator::at(52.52, 13.405);
        let here = Location::new(Coordinate::new(0.0, 0.0).unwrap())
            .with_name("Alexanderplatz")
            .with_address("Alexanderplatz, Berlin");
        let gateway = ReverseOnly(Ok(here));

        let location = current_location(&locator, &gateway, &GeoOptions::default())
            .await
            .unwrap();
        assert_eq!(location.name.as_deref(), Some("Alexanderplatz"));
        assert_eq!(location.address.as_deref(), Some("Alexanderplatz, Berlin"));
        assert_eq!(location.coordinate, Coordinate::new(52.52, 13.405).unwrap());
        assert!(location.is_current_location);
    }

    #[tokio::test]
    async fn test_reverse_geocode_failure_falls_back() {
        let locator = FixedLocator::at(52.52, 13.405);
        let gateway = ReverseOnly(Err(GatewayError::network("offline")));

        let location = current_location(&locator, &gateway, &GeoOptions::default())
            .await
            .unwrap();
        assert_eq!(location.name.as_deref(), Some(CURRENT_LOCATION_NAME));
        assert_eq!(location.address.as_deref(), Some(ADDRESS_NOT_FOUND));
        assert!(location.is_current_location);
    }

    #[tokio::test]
    async fn test_coordinate_only_reverse_result_falls_back() {
        let locator = FixedLocator::at(1.0, 1.0);
        let gateway = ReverseOnly(Ok(Location::new(Coordinate::new(1.0, 1.0).unwrap())));

        let location = current_location(&locator, &gateway, &GeoOptions::default())
            .await
            .unwrap();
        assert_eq!(location.name.as_deref(), Some(CURRENT_LOCATION_NAME));
        assert_eq!(location.address.as_deref(), Some(ADDRESS_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_permission_denied() {
        let mut locator = FixedLocator::at(0.0, 0.0);
        locator.permission = false;
        let gateway = ReverseOnly(Err(GatewayError::MissingApiKey));

        let result = current_location(&locator, &gateway, &GeoOptions::default()).await;
        assert_eq!(result, Err(LocationError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_device_error_is_returned() {
        let mut locator = FixedLocator::at(0.0, 0.0);
        locator.fix = Err(LocationError::Unavailable("no satellites".to_string()));
        let gateway = ReverseOnly(Err(GatewayError::MissingApiKey));

        let result = current_location(&locator, &gateway, &GeoOptions::default()).await;
        assert!(matches!(result, Err(LocationError::Unavailable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_device_times_out() {
        let mut locator = FixedLocator::at(0.0, 0.0);
        locator.delay = Duration::from_secs(60);
        let gateway = ReverseOnly(Err(GatewayError::MissingApiKey));

        let result = current_location(&locator, &gateway, &GeoOptions::default()).await;
        assert_eq!(result, Err(LocationError::Timeout));
    }

    #[test]
    fn test_default_options() {
        let options = GeoOptions::default();
        assert!(options.enable_high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(15));
        assert_eq!(options.maximum_age, Duration::from_secs(10));
    }
}
