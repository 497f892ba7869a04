//! Google Maps web services client
//!
//! Every operation is a single GET against `{base_url}/{endpoint}/json`.
//! Transient failures (network errors, rate limiting, provider outages) are
//! retried with bounded exponential backoff; everything else is returned to
//! the caller as a typed [`GatewayError`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::{RetryDecision, RetryPolicy};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, error, info, instrument, warn};

use super::responses::{
    AutocompleteResponse, DirectionsResponse, GeocodingResponse, NearbySearchResponse,
    PlaceDetailsResponse, ProviderReply,
};
use super::middleware::RequestLogger;
use super::{GatewayError, MapUrls, PlacesGateway, ProviderStatus};
use crate::config::MapsConfig;
use crate::models::{Coordinate, Location, Place, PlaceSuggestion, RouteLeg, TravelMode};

/// Fields requested from the place details endpoint
pub const PLACE_DETAILS_FIELDS: &str = "place_id,name,formatted_address,geometry,vicinity,photos,rating,user_ratings_total,opening_hours,types,price_level,website,international_phone_number,icon";

const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Google Maps gateway
pub struct GoogleMapsClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: Option<String>,
    retry_policy: ExponentialBackoff,
}

impl GoogleMapsClient {
    /// Create a new client from the maps configuration. A missing key is
    /// accepted here; every operation then fails with `MissingApiKey`.
    pub fn new(config: &MapsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(format!("halfway/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(
                Duration::from_millis(config.retry_min_delay_ms),
                Duration::from_millis(config.retry_max_delay_ms),
            )
            .build_with_max_retries(config.max_retries);

        if config.api_key().is_none() {
            warn!("No maps API key configured; maps operations will fail");
        }

        Ok(Self {
            client: ClientBuilder::new(client).with(RequestLogger).build(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key().map(str::to_string),
            retry_policy,
        })
    }

    /// Photo and static map URL builder sharing this client's key
    #[must_use]
    pub fn urls(&self) -> MapUrls {
        MapUrls::new(self.base_url.clone(), self.api_key.clone())
    }

    fn api_key(&self) -> Result<&str, GatewayError> {
        self.api_key.as_deref().ok_or(GatewayError::MissingApiKey)
    }

    /// Call `endpoint` and decode its reply, retrying transient failures.
    /// On success the reply's status is either `Ok` or `EmptyResult`.
    async fn fetch<T>(
        &self,
        operation: &str,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<(T, ProviderStatus), GatewayError>
    where
        T: DeserializeOwned + ProviderReply,
    {
        let key = self.api_key()?;
        let url = Url::parse_with_params(
            &format!("{}/{}/json", self.base_url, endpoint),
            params
                .iter()
                .map(|(name, value)| (*name, value.as_str()))
                .chain(std::iter::once(("key", key))),
        )
        .map_err(|e| GatewayError::InvalidRequest {
            message: format!("Invalid request URL for {endpoint}: {e}"),
            status: None,
        })?;

        let request_start = Instant::now();
        let retry_start = SystemTime::now();
        let mut past_retries = 0;

        loop {
            debug!("Requesting {} (attempt {})", endpoint, past_retries + 1);

            match self.attempt::<T>(operation, &url).await {
                Ok(reply) => {
                    let total_duration = request_start.elapsed();
                    info!(
                        "{} answered in {:.3}s (attempt {})",
                        endpoint,
                        total_duration.as_secs_f64(),
                        past_retries + 1
                    );
                    if total_duration > SLOW_RESPONSE {
                        warn!(
                            "Slow maps API response detected: {:.3}s",
                            total_duration.as_secs_f64()
                        );
                    }
                    return Ok(reply);
                }
                Err(err) if err.is_retryable() => {
                    match self.retry_policy.should_retry(retry_start, past_retries) {
                        RetryDecision::Retry { execute_after } => {
                            let backoff = execute_after
                                .duration_since(SystemTime::now())
                                .unwrap_or_default();
                            warn!(
                                "{} failed on attempt {}: {}; retrying in {:.1}s",
                                endpoint,
                                past_retries + 1,
                                err,
                                backoff.as_secs_f64()
                            );
                            tokio::time::sleep(backoff).await;
                            past_retries += 1;
                        }
                        RetryDecision::DoNotRetry => {
                            error!(
                                "{} failed after {} attempts: {}",
                                endpoint,
                                past_retries + 1,
                                err
                            );
                            return Err(err);
                        }
                    }
                }
                Err(err) => {
                    warn!("{} failed: {}", endpoint, err);
                    return Err(err);
                }
            }
        }
    }

    async fn attempt<T>(&self, operation: &str, url: &Url) -> Result<(T, ProviderStatus), GatewayError>
    where
        T: DeserializeOwned + ProviderReply,
    {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport_error)?;

        let http_status = response.status();
        if !http_status.is_success() {
            return Err(GatewayError::from_status(
                ProviderStatus::from_http(http_status.as_u16()),
                format!("Failed to {operation}: HTTP {}", http_status.as_u16()),
                None,
            ));
        }

        let body = response.text().await.map_err(reqwest_error)?;
        let reply: T = serde_json::from_str(&body).map_err(|e| GatewayError::Unavailable {
            message: format!("Invalid response while trying to {operation}: {e}"),
            status: None,
        })?;

        let status = ProviderStatus::from_code(reply.status());
        if status.is_success() {
            return Ok((reply, status));
        }

        let message = reply
            .error_message()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Failed to {operation}: {}", reply.status()));
        Err(GatewayError::from_status(status, message, Some(reply.status())))
    }
}

fn transport_error(err: reqwest_middleware::Error) -> GatewayError {
    match err {
        reqwest_middleware::Error::Reqwest(err) => reqwest_error(err),
        reqwest_middleware::Error::Middleware(err) => GatewayError::network(err.to_string()),
    }
}

// The request URL carries the key, so it never reaches the message
fn reqwest_error(err: reqwest::Error) -> GatewayError {
    let err = err.without_url();
    if err.is_timeout() {
        GatewayError::Unavailable {
            message: format!("Request timed out: {err}"),
            status: None,
        }
    } else {
        GatewayError::network(err.to_string())
    }
}

fn empty_result(message: impl Into<String>) -> GatewayError {
    GatewayError::provider(message, Some("ZERO_RESULTS"))
}

#[async_trait]
impl PlacesGateway for GoogleMapsClient {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Location, GatewayError> {
        let (reply, status) = self
            .fetch::<GeocodingResponse>("geocode address", "geocode", &[("address", address.to_string())])
            .await?;

        if status == ProviderStatus::EmptyResult {
            return Err(empty_result(format!("No results found for '{address}'")));
        }

        let location = reply
            .results
            .into_iter()
            .next()
            .and_then(|result| result.into_location(address))
            .ok_or_else(|| {
                GatewayError::provider(format!("No usable result for '{address}'"), Some("OK"))
            })?;

        debug!("Geocoded '{}' to {}", address, location.coordinate);
        Ok(location)
    }

    #[instrument(skip(self), fields(coordinate = %coordinate))]
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Location, GatewayError> {
        let (reply, _) = self
            .fetch::<GeocodingResponse>(
                "reverse geocode",
                "geocode",
                &[("latlng", coordinate.to_query_value())],
            )
            .await?;

        match reply.results.into_iter().next() {
            Some(result) => Ok(result.into_reverse_location(coordinate)),
            None => {
                debug!("No address for {}", coordinate);
                Ok(Location::new(coordinate))
            }
        }
    }

    #[instrument(skip(self))]
    async fn autocomplete(&self, input: &str) -> Result<Vec<PlaceSuggestion>, GatewayError> {
        self.api_key()?;
        if input.trim().is_empty() {
            return Ok(Vec::new());
        }

        let (reply, _) = self
            .fetch::<AutocompleteResponse>(
                "fetch suggestions",
                "place/autocomplete",
                &[("input", input.to_string())],
            )
            .await?;

        Ok(reply.predictions.into_iter().map(PlaceSuggestion::from).collect())
    }

    #[instrument(skip(self))]
    async fn place_details(&self, place_id: &str) -> Result<Place, GatewayError> {
        let (reply, status) = self
            .fetch::<PlaceDetailsResponse>(
                "fetch place details",
                "place/details",
                &[
                    ("place_id", place_id.to_string()),
                    ("fields", PLACE_DETAILS_FIELDS.to_string()),
                ],
            )
            .await?;

        if status == ProviderStatus::EmptyResult {
            return Err(empty_result(format!("Place '{place_id}' not found")));
        }

        reply
            .result
            .and_then(|result| result.into_place(Some(place_id)))
            .ok_or_else(|| GatewayError::provider(format!("Place '{place_id}' not found"), Some("OK")))
    }

    #[instrument(skip(self), fields(location = %location))]
    async fn nearby_search(
        &self,
        location: Coordinate,
        radius_meters: u32,
        place_type: Option<&str>,
    ) -> Result<Vec<Place>, GatewayError> {
        let mut params = vec![
            ("location", location.to_query_value()),
            ("radius", radius_meters.to_string()),
        ];
        if let Some(place_type) = place_type.filter(|t| !t.trim().is_empty()) {
            params.push(("type", place_type.to_string()));
        }

        let (reply, _) = self
            .fetch::<NearbySearchResponse>("search nearby places", "place/nearbysearch", &params)
            .await?;

        let places: Vec<Place> = reply
            .results
            .into_iter()
            .filter_map(|result| result.into_place(None))
            .collect();

        debug!("Found {} places near {}", places.len(), location);
        Ok(places)
    }

    #[instrument(skip(self), fields(origin = %origin, destination = %destination))]
    async fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
    ) -> Result<RouteLeg, GatewayError> {
        let (reply, _) = self
            .fetch::<DirectionsResponse>(
                "fetch directions",
                "directions",
                &[
                    ("origin", origin.to_query_value()),
                    ("destination", destination.to_query_value()),
                    ("mode", mode.as_str().to_string()),
                ],
            )
            .await?;

        reply
            .into_first_leg()
            .ok_or_else(|| empty_result("No routes found"))
    }
}
