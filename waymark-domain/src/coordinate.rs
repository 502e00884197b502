//! Geographic coordinate value object.
//!
//! Immutable, validated at construction time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain errors for value object validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Latitude or longitude out of range
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

// =============================================================================
// Coordinate
// =============================================================================

/// A geographic point in decimal degrees.
///
/// # Invariants
/// - Latitude must be within [-90, 90]
/// - Longitude must be within [-180, 180]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
}

impl Coordinate {
    /// Create a new Coordinate with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidCoordinate` if either component is
    /// out of range or not finite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, DomainError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(DomainError::InvalidCoordinate(format!(
                "Latitude out of range: {}",
                lat
            )));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(DomainError::InvalidCoordinate(format!(
                "Longitude out of range: {}",
                lng
            )));
        }
        Ok(Self { lat, lng })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

// =============================================================================
// Tests
// =============================================================================
