//! Waymark Domain Layer
//!
//! Pure domain logic with zero I/O dependencies.
//! Contains the entities and value objects shared by every other crate.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod coordinate;
pub mod fix;
pub mod marker;
pub mod preference;

// Re-export commonly used types
pub use coordinate::{Coordinate, DomainError};
pub use fix::PositionFix;
pub use marker::Marker;
pub use preference::StartPreference;
