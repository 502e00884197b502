//! Start-location preference.
//!
//! The persisted answer to "start the application at this location in the
//! future?". Stored as a singleton record under a fixed key.

use serde::{Deserialize, Serialize};

use crate::Coordinate;

// =============================================================================
// StartPreference
// =============================================================================

/// The persisted start-location decision.
///
/// # Invariants
/// - `start_here == true` implies `latlng` holds the fix that was active at
///   the moment of confirmation. A stored record violating this is treated as
///   undecided, not as an error.
///
/// Field names follow the stored wire shape (`startHere` / `latlng`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPreference {
    /// Whether the user asked to start at the remembered location
    pub start_here: bool,
    /// The remembered location, present only after an affirmative answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latlng: Option<Coordinate>,
}

impl StartPreference {
    /// An affirmative answer: remember this coordinate.
    pub fn remember(coord: Coordinate) -> Self {
        Self {
            start_here: true,
            latlng: Some(coord),
        }
    }

    /// A negative answer. Explicitly clears any earlier undecided state.
    pub fn declined() -> Self {
        Self {
            start_here: false,
            latlng: None,
        }
    }

    /// Whether this preference can actually drive the startup viewport.
    pub fn is_usable(&self) -> bool {
        self.start_here && self.latlng.is_some()
    }
}

// =============================================================================
// Tests
// =============================================================================
