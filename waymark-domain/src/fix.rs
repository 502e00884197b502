//! Position fixes delivered by the geolocation sensor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Coordinate;

/// A single geolocation reading.
///
/// Fixes are transient: they are consumed immediately by viewport recentering
/// and by the start-location preference flow, never persisted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    /// Where the sensor placed the user
    pub coord: Coordinate,
    /// When the reading was acquired
    pub acquired_at: DateTime<Utc>,
}

impl PositionFix {
    /// Create a fix acquired now.
    pub fn new(coord: Coordinate) -> Self {
        Self {
            coord,
            acquired_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_carries_coordinate() {
        let coord = Coordinate::new(42.9758025, -81.244782).unwrap();
        let fix = PositionFix::new(coord);

        assert_eq!(fix.coord, coord);
        assert!(fix.acquired_at <= Utc::now());
    }
}
