//! Geodesic midpoint and fairness scoring
//!
//! The midpoint is computed on the unit sphere: both endpoints are turned
//! into n-vectors, summed and normalised, which yields the point halfway
//! along the great circle between them. Distances use the haversine
//! formula on a 6371 km sphere, so both parties are equidistant up to
//! floating point error.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Coordinate, Location};

/// Below this vector norm the endpoints are treated as antipodal
const ANTIPODAL_EPSILON: f64 = 1e-12;

/// Categorical fairness of a meeting point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FairnessLabel {
    #[serde(rename = "Very Fair")]
    VeryFair,
    #[serde(rename = "Fair")]
    Fair,
    #[serde(rename = "Slightly Unfair")]
    SlightlyUnfair,
    #[serde(rename = "Unfair")]
    Unfair,
}

impl FairnessLabel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FairnessLabel::VeryFair => "Very Fair",
            FairnessLabel::Fair => "Fair",
            FairnessLabel::SlightlyUnfair => "Slightly Unfair",
            FairnessLabel::Unfair => "Unfair",
        }
    }
}

impl fmt::Display for FairnessLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bounds (inclusive, km) of the fairness delta for each label.
/// Anything above `slightly_unfair_km` is [`FairnessLabel::Unfair`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FairnessThresholds {
    pub very_fair_km: f64,
    pub fair_km: f64,
    pub slightly_unfair_km: f64,
}

impl Default for FairnessThresholds {
    fn default() -> Self {
        Self {
            very_fair_km: 0.5,
            fair_km: 2.0,
            slightly_unfair_km: 5.0,
        }
    }
}

impl FairnessThresholds {
    /// Map a fairness delta onto its label
    #[must_use]
    pub fn label(&self, delta_km: f64) -> FairnessLabel {
        if delta_km <= self.very_fair_km {
            FairnessLabel::VeryFair
        } else if delta_km <= self.fair_km {
            FairnessLabel::Fair
        } else if delta_km <= self.slightly_unfair_km {
            FairnessLabel::SlightlyUnfair
        } else {
            FairnessLabel::Unfair
        }
    }

    /// Thresholds must be non-negative and strictly increasing
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.very_fair_km >= 0.0
            && self.very_fair_km < self.fair_km
            && self.fair_km < self.slightly_unfair_km
            && self.slightly_unfair_km.is_finite()
    }
}

/// A computed meeting point between two parties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Midpoint {
    pub location: Location,
    pub distance_from_a_km: f64,
    pub distance_from_b_km: f64,
    /// `|distance_from_a_km - distance_from_b_km|`
    pub fairness_delta_km: f64,
    pub fairness: FairnessLabel,
}

impl Midpoint {
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        self.location.coordinate
    }
}

/// Compute the midpoint between `a` and `b` with the default thresholds
#[must_use]
pub fn compute_midpoint(a: Coordinate, b: Coordinate) -> Midpoint {
    compute_midpoint_with(a, b, &FairnessThresholds::default())
}

/// Compute the midpoint between `a` and `b`, labelling it with `thresholds`
#[must_use]
pub fn compute_midpoint_with(a: Coordinate, b: Coordinate, thresholds: &FairnessThresholds) -> Midpoint {
    let center = geodesic_midpoint(a, b);
    let distance_from_a_km = a.distance_km(&center);
    let distance_from_b_km = b.distance_km(&center);
    let fairness_delta_km = (distance_from_a_km - distance_from_b_km).abs();

    Midpoint {
        location: Location::new(center),
        distance_from_a_km,
        distance_from_b_km,
        fairness_delta_km,
        fairness: thresholds.label(fairness_delta_km),
    }
}

/// Point halfway along the great circle from `a` to `b`
#[must_use]
pub fn geodesic_midpoint(a: Coordinate, b: Coordinate) -> Coordinate {
    if a == b {
        return a;
    }

    let va = to_unit_vector(a);
    let vb = to_unit_vector(b);
    let sum = [va[0] + vb[0], va[1] + vb[1], va[2] + vb[2]];

    if norm(sum) < ANTIPODAL_EPSILON {
        return antipodal_midpoint(va);
    }

    from_vector(sum)
}

/// For antipodal endpoints every point on the bisecting great circle is
/// equidistant. Pick the one on the meridian of `a` heading north (or the
/// prime meridian when `a` is a pole). Projecting out `v` gives the same
/// result for `v` and `-v`, so the choice is symmetric.
fn antipodal_midpoint(v: [f64; 3]) -> Coordinate {
    let towards_pole = reject([0.0, 0.0, 1.0], v);
    let direction = if norm(towards_pole) < ANTIPODAL_EPSILON {
        reject([1.0, 0.0, 0.0], v)
    } else {
        towards_pole
    };
    from_vector(direction)
}

fn to_unit_vector(c: Coordinate) -> [f64; 3] {
    let lat = c.latitude().to_radians();
    let lon = c.longitude().to_radians();
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

fn from_vector(v: [f64; 3]) -> Coordinate {
    let lat = v[2].atan2(v[0].hypot(v[1])).to_degrees();
    let lon = v[1].atan2(v[0]).to_degrees();
    Coordinate::clamped(lat, lon)
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Component of `u` perpendicular to unit vector `v`
fn reject(u: [f64; 3], v: [f64; 3]) -> [f64; 3] {
    let dot = u[0] * v[0] + u[1] * v[1] + u[2] * v[2];
    [u[0] - dot * v[0], u[1] - dot * v[1], u[2] - dot * v[2]]
}
