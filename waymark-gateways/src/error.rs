//! Gateway layer errors
//!
//! Failures from the sensor, the view surface, and the dialog widgets.
//! All of them are caught and logged at their origin; none terminates the
//! session.

use thiserror::Error;

// =============================================================================
// Geolocation errors
// =============================================================================

/// Classified failures from the position sensor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    /// The geolocation capability is absent on this platform
    #[error("Geolocation is not supported on this device")]
    Unsupported,

    /// Permission was denied to access location services
    #[error("[PERMISSION_DENIED] {0}")]
    PermissionDenied(String),

    /// The sensor was not able to determine a location
    #[error("[POSITION_UNAVAILABLE] {0}")]
    PositionUnavailable(String),

    /// The sensor failed to determine a location within the timeout duration
    #[error("[TIMEOUT] {0}")]
    Timeout(String),
}

impl GeoError {
    /// Classify a numeric sensor failure code with its raw message.
    ///
    /// Codes follow the sensor convention: 1 = permission denied,
    /// 2 = position unavailable, 3 = timeout. Unknown codes are treated as
    /// position-unavailable.
    pub fn from_code(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            1 => Self::PermissionDenied(message),
            3 => Self::Timeout(message),
            _ => Self::PositionUnavailable(message),
        }
    }

    /// The classification tag, for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unsupported => "UNSUPPORTED",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::PositionUnavailable(_) => "POSITION_UNAVAILABLE",
            Self::Timeout(_) => "TIMEOUT",
        }
    }
}

// =============================================================================
// View errors
// =============================================================================

/// Failures from the render-only view binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// Creating a marker overlay failed
    #[error("Render failed: {0}")]
    Render(String),
}

// =============================================================================
// Dialog errors
// =============================================================================

/// Failures from the dialog/toast widget layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogError {
    /// The widget layer could not show or resolve the dialog
    #[error("Dialog failed: {0}")]
    Failed(String),
}

// =============================================================================
// Tests
// =============================================================================
