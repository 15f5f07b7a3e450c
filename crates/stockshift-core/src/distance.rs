//! Flat-earth distance proxy between stores.
//!
//! All stores sit inside one region, so a degree-delta Euclidean distance
//! scaled by ~69 miles per degree is close enough for ranking transfers.

use serde::{Deserialize, Serialize};

pub const MILES_PER_DEGREE: f64 = 69.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Approximate miles between two coordinates.
///
/// Symmetric, and zero for identical points. Routes between the same store
/// are rejected before this is ever called with equal inputs.
#[must_use]
pub fn distance_miles(a: Coordinates, b: Coordinates) -> f64 {
    let lat_diff = (a.lat - b.lat).abs();
    let lng_diff = (a.lng - b.lng).abs();
    lat_diff.hypot(lng_diff) * MILES_PER_DEGREE
}
