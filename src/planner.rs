//! Turning two location inputs into a ranked meeting plan

use futures::join;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::SearchConfig;
use crate::gateway::{GatewayError, PlacesGateway};
use crate::midpoint::{FairnessThresholds, Midpoint, compute_midpoint_with};
use crate::models::{Coordinate, Location, Place};
use crate::ranking::rank_places_with;
use crate::session::{MeetingSession, Party};
use crate::Result;

/// Prefix marking an explicit place id in free-form input
pub const PLACE_ID_PREFIX: &str = "place_id:";

/// What a user typed (or picked) for one party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationQuery {
    /// "lat,lng" or "lat lng"
    Coordinates(Coordinate),
    /// Free-form address to geocode
    Address(String),
    /// Place id picked from autocomplete
    PlaceId(String),
}

impl LocationQuery {
    /// Classify raw input. Blank input yields `None`.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Some(place_id) = input.strip_prefix(PLACE_ID_PREFIX) {
            let place_id = place_id.trim();
            if !place_id.is_empty() {
                return Some(LocationQuery::PlaceId(place_id.to_string()));
            }
        }

        if let Some(coordinate) = Self::parse_coordinates(input) {
            return Some(LocationQuery::Coordinates(coordinate));
        }

        Some(LocationQuery::Address(input.to_string()))
    }

    /// Parse coordinates from strings like "46.8182,8.2275" or "46.8182 8.2275".
    /// Out-of-range values are not coordinates.
    fn parse_coordinates(input: &str) -> Option<Coordinate> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        let [lat, lon] = parts.as_slice() else {
            return None;
        };

        let lat = lat.parse::<f64>().ok()?;
        let lon = lon.parse::<f64>().ok()?;
        Coordinate::new(lat, lon).ok()
    }
}

/// Midpoint plus the places ranked around it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingPlan {
    pub midpoint: Midpoint,
    pub places: Vec<Place>,
}

pub struct MeetingPlanner {
    gateway: Arc<dyn PlacesGateway>,
    search: SearchConfig,
    thresholds: FairnessThresholds,
}

impl MeetingPlanner {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn PlacesGateway>,
        search: SearchConfig,
        thresholds: FairnessThresholds,
    ) -> Self {
        Self {
            gateway,
            search,
            thresholds,
        }
    }

    #[must_use]
    pub fn gateway(&self) -> &Arc<dyn PlacesGateway> {
        &self.gateway
    }

    #[must_use]
    pub fn thresholds(&self) -> &FairnessThresholds {
        &self.thresholds
    }

    /// Resolve one input into a [`Location`]
    #[instrument(skip(self))]
    pub async fn resolve(&self, query: &LocationQuery) -> Result<Location> {
        let location = match query {
            LocationQuery::Coordinates(coordinate) => {
                // Best effort: a bare coordinate is still a usable location
                match self.gateway.reverse_geocode(*coordinate).await {
                    Ok(location) => location,
                    Err(e) => {
                        debug!("Reverse geocoding failed: {}, using coordinates as name", e);
                        Location::new(*coordinate)
                    }
                }
            }
            LocationQuery::Address(address) => self.gateway.geocode(address).await?,
            LocationQuery::PlaceId(place_id) => {
                let place = self.gateway.place_details(place_id).await?;
                let coordinate = place.coordinate.ok_or_else(|| {
                    GatewayError::provider(
                        format!("Place '{}' has no location", place.place_id),
                        None,
                    )
                })?;
                let mut location = Location::new(coordinate).with_name(place.name.clone());
                if let Some(address) = place.display_address() {
                    location = location.with_address(address);
                }
                location
            }
        };

        debug!(
            "Resolved location: {} at ({})",
            location.display_name(),
            location.coordinate
        );
        Ok(location)
    }

    /// Resolve both parties concurrently
    pub async fn resolve_both(
        &self,
        query_a: &LocationQuery,
        query_b: &LocationQuery,
    ) -> (Result<Location>, Result<Location>) {
        join!(self.resolve(query_a), self.resolve(query_b))
    }

    /// Resolve `query` into the session slot for `party`. Failures are
    /// recorded on the session as well as returned.
    pub async fn locate(
        &self,
        session: &Mutex<MeetingSession>,
        party: Party,
        query: &LocationQuery,
    ) -> Result<Location> {
        match self.resolve(query).await {
            Ok(location) => {
                session.lock().await.set_location(party, location.clone());
                Ok(location)
            }
            Err(e) => {
                session
                    .lock()
                    .await
                    .record_location_error(party, e.user_message());
                Err(e)
            }
        }
    }

    /// Compute the midpoint between `a` and `b`, name it and rank the
    /// places around it. `category` overrides the configured one.
    #[instrument(skip(self, a, b), fields(a = %a.coordinate, b = %b.coordinate))]
    pub async fn plan(&self, a: &Location, b: &Location, category: Option<&str>) -> Result<MeetingPlan> {
        let mut midpoint = compute_midpoint_with(a.coordinate, b.coordinate, &self.thresholds);
        let center = midpoint.coordinate();
        let category = category
            .filter(|c| !c.trim().is_empty())
            .or(self.search.category.as_deref());

        info!(
            "Midpoint {} ({:.2}km / {:.2}km, {})",
            center, midpoint.distance_from_a_km, midpoint.distance_from_b_km, midpoint.fairness
        );

        let (named, nearby) = join!(
            self.gateway.reverse_geocode(center),
            self.gateway
                .nearby_search(center, self.search.radius_meters, category)
        );

        match named {
            Ok(named) => {
                midpoint.location.name = named.name;
                midpoint.location.address = named.address;
            }
            Err(e) => warn!("Could not name midpoint {}: {}", center, e),
        }

        let candidates = nearby?;
        let places = rank_places_with(
            &candidates,
            center,
            a.coordinate,
            b.coordinate,
            &self.search.ranking_options(),
        );
        info!("Ranked {} of {} nearby places", places.len(), candidates.len());

        Ok(MeetingPlan { midpoint, places })
    }

    /// Run a search over the session's current locations and apply it.
    /// Returns `Ok(false)` when the session changed while searching and the
    /// result was discarded.
    pub async fn run(&self, session: &Mutex<MeetingSession>, category: Option<&str>) -> Result<bool> {
        let ticket = session.lock().await.begin_search()?;

        match self
            .plan(ticket.location_a(), ticket.location_b(), category)
            .await
        {
            Ok(plan) => Ok(session.lock().await.complete_search(&ticket, plan)),
            Err(e) => {
                session.lock().await.fail_search(&ticket, e.user_message());
                Err(e)
            }
        }
    }
}
