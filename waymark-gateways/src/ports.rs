//! Gateway port definitions.
//!
//! Ports define the interfaces for the external capabilities the engine
//! calls into (sensor, view surface, dialogs). Adapters implement these
//! ports for a concrete platform (browser runtime, mobile shell, stub).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use waymark_domain::{Coordinate, PositionFix};

use crate::error::{DialogError, GeoError, ViewError};

// =============================================================================
// Geolocation Port
// =============================================================================

/// Handle identifying a continuous watch subscription.
pub type WatchId = u64;

/// Stream of watch updates: delivered fixes or classified per-update failures.
pub type WatchStream = mpsc::Receiver<Result<PositionFix, GeoError>>;

/// Acquisition options for a continuous watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Request high-accuracy positioning (more power, slower)
    pub high_accuracy: bool,
    /// Oldest acceptable cached fix; zero disables the cache
    pub maximum_age: Duration,
    /// Per-update deadline before the sensor reports a timeout failure
    pub timeout: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: false,
            maximum_age: Duration::ZERO,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Port for the position sensor.
///
/// Implementations:
/// - `StubGeolocation` - For testing (scripted fixes, injectable streams)
/// - A platform adapter over the native geolocation capability
#[async_trait]
pub trait GeolocationPort: Send + Sync {
    /// Whether the capability exists on this platform.
    ///
    /// Checked by the engine before every mode entry; when `false`, all
    /// acquisition operations are logged no-ops.
    fn available(&self) -> bool;

    /// Issue exactly one position request.
    async fn current_position(&self) -> Result<PositionFix, GeoError>;

    /// Start a continuous watch.
    ///
    /// Returns the sensor-assigned handle and a receiver yielding every
    /// delivered fix or per-update failure until the watch is cleared.
    async fn watch_position(
        &self,
        options: WatchOptions,
    ) -> Result<(WatchId, WatchStream), GeoError>;

    /// Cancel a continuous watch.
    async fn clear_watch(&self, watch_id: WatchId);
}

// =============================================================================
// View Binding Port
// =============================================================================

/// Removal affordance bound to a marker at creation time.
///
/// Invoked by the view layer when the user asks to remove the marker from its
/// rendered overlay; carries the literal identity tuple via capture.
pub type RemoveCallback = Arc<dyn Fn() + Send + Sync>;

/// Handle to a rendered marker overlay.
///
/// Exclusively owned by the in-memory marker entry that created it; never
/// persisted, recreated on rehydration.
pub trait MarkerView: Send + Sync {
    /// Remove the overlay from the map surface.
    fn detach(&self);
}

/// Port for the render-only view binding.
///
/// Rendering is synchronous: only sensor acquisition, dialog confirmation,
/// and persistent-store access suspend.
pub trait MapViewPort: Send + Sync {
    /// Render a marker overlay with its removal affordance.
    fn create_marker_view(
        &self,
        coord: Coordinate,
        title: &str,
        on_remove: RemoveCallback,
    ) -> Result<Box<dyn MarkerView>, ViewError>;

    /// Recenter the map viewport.
    fn set_viewport(&self, center: Coordinate, zoom: f64);
}

// =============================================================================
// Dialog Port
// =============================================================================

/// Port for the dialog/toast widgets.
#[async_trait]
pub trait DialogPort: Send + Sync {
    /// Binary confirmation; resolves to the user's answer.
    async fn confirm(&self, message: &str) -> Result<bool, DialogError>;

    /// Free-text prompt; `None` means the user cancelled.
    async fn prompt_text(&self, message: &str) -> Result<Option<String>, DialogError>;

    /// Fire-and-forget notification.
    async fn toast(&self, message: &str);
}

// =============================================================================
// Tests
// =============================================================================
