//! Waymark Gateway Layer
//!
//! Ports for the external capabilities the engine depends on, and stub
//! adapters for tests and the demo harness.
//!
//! # Architecture
//!
//! - **`GeolocationPort`**: the position sensor (one-shot and continuous
//!   watch query modes, availability flag)
//! - **`MapViewPort` / `MarkerView`**: the render-only view binding (marker
//!   overlays, viewport)
//! - **`DialogPort`**: user confirmation, text prompt, and toast widgets
//!
//! Adapters implement these ports for a concrete platform; the stubs here
//! simulate that platform in-process.

#![warn(clippy::all)]

// Modules
mod error;
mod ports;
mod stub;

// Re-exports
pub use error::{DialogError, GeoError, ViewError};
pub use ports::{
    DialogPort, GeolocationPort, MapViewPort, MarkerView, RemoveCallback, WatchId, WatchOptions,
    WatchStream,
};
pub use stub::{StubDialog, StubGeolocation, StubMapView};
