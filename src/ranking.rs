//! Ranking of candidate places around a meeting point

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use crate::models::{Coordinate, Place};

/// Optional filters applied after ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingOptions {
    /// Drop places where one party travels this much further than the other
    pub max_travel_imbalance_km: Option<f64>,
    /// Keep at most this many places
    pub max_results: Option<usize>,
}

/// Rank `places` by distance from `midpoint`.
///
/// Closest first; equal distances are ordered by rating and then review
/// count, both descending. Places without a coordinate are dropped. The
/// input is left untouched and a new list is returned.
#[must_use]
pub fn rank_places(
    places: &[Place],
    midpoint: Coordinate,
    origin_a: Coordinate,
    origin_b: Coordinate,
) -> Vec<Place> {
    rank_places_with(places, midpoint, origin_a, origin_b, &RankingOptions::default())
}

/// [`rank_places`] with imbalance filtering and a result cap
#[must_use]
pub fn rank_places_with(
    places: &[Place],
    midpoint: Coordinate,
    origin_a: Coordinate,
    origin_b: Coordinate,
    options: &RankingOptions,
) -> Vec<Place> {
    let mut ranked: Vec<Place> = places
        .iter()
        .filter_map(|place| {
            let Some(coordinate) = place.coordinate else {
                debug!("Dropping place '{}' without coordinates", place.place_id);
                return None;
            };

            if let Some(max_imbalance) = options.max_travel_imbalance_km {
                let imbalance = travel_imbalance_km(coordinate, origin_a, origin_b);
                if imbalance > max_imbalance {
                    debug!(
                        "Dropping place '{}': travel imbalance {:.2}km exceeds {:.2}km",
                        place.place_id, imbalance, max_imbalance
                    );
                    return None;
                }
            }

            let mut ranked_place = place.clone();
            ranked_place.distance_from_midpoint_km = Some(coordinate.distance_km(&midpoint));
            Some(ranked_place)
        })
        .collect();

    ranked.sort_by(compare_ranked);

    if let Some(max_results) = options.max_results {
        ranked.truncate(max_results);
    }

    ranked
}

/// How much further one party travels to `place` than the other
#[must_use]
pub fn travel_imbalance_km(place: Coordinate, origin_a: Coordinate, origin_b: Coordinate) -> f64 {
    (origin_a.distance_km(&place) - origin_b.distance_km(&place)).abs()
}

fn compare_ranked(a: &Place, b: &Place) -> Ordering {
    let distance_a = a.distance_from_midpoint_km.unwrap_or(f64::INFINITY);
    let distance_b = b.distance_from_midpoint_km.unwrap_or(f64::INFINITY);

    distance_a
        .total_cmp(&distance_b)
        .then_with(|| b.rating.total_cmp(&a.rating))
        .then_with(|| b.user_ratings_total.cmp(&a.user_ratings_total))
        .then_with(|| a.place_id.cmp(&b.place_id))
}
