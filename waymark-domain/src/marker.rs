//! Map marker entity.
//!
//! A marker is both a persisted record and an in-memory entry. The rendered
//! view handle is deliberately NOT part of this type: it lives beside the
//! marker in the engine's collection and is recreated from this record on
//! every reload.

use serde::{Deserialize, Serialize};

use crate::Coordinate;

// =============================================================================
// Marker
// =============================================================================

/// A user-placed, titled map marker.
///
/// Identity is the full `(lat, lng, title)` tuple. No separate identifier is
/// assigned, so two markers sharing all three fields are indistinguishable;
/// lookups match the first entry in collection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Latitude of the marker position
    pub lat: f64,
    /// Longitude of the marker position
    pub lng: f64,
    /// User-supplied label
    pub title: String,
}

impl Marker {
    /// Create a marker at the given coordinate.
    pub fn new(coord: Coordinate, title: impl Into<String>) -> Self {
        Self {
            lat: coord.lat,
            lng: coord.lng,
            title: title.into(),
        }
    }

    /// The marker position as a coordinate.
    ///
    /// Persisted values are trusted; components outside the valid coordinate
    /// range surface as a malformed snapshot at decode time instead.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lng: self.lng,
        }
    }

    /// Exact identity-tuple match.
    pub fn matches(&self, lat: f64, lng: f64, title: &str) -> bool {
        self.lat == lat && self.lng == lng && self.title == title
    }
}

// =============================================================================
// Tests
// =============================================================================
