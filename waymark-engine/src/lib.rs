//! Waymark Engine
//!
//! The location & marker state engine: acquisition state machine, marker
//! collection, and start-location preference flow, coordinated by an
//! explicit session context.
//!
//! # Architecture
//!
//! ```text
//! Sensor ──▶ Geolocation Engine ──▶ View (recenter)
//!                    │
//!                    └─(debounce)─▶ Start Preference Flow ──▶ Dialog / Store
//!
//! View (clicks, remove taps) ──▶ Session ──▶ Marker Store ──▶ Store / View
//! ```
//!
//! # Components
//!
//! - **`Session`**: explicit per-run context; bootstrap, map-click flow,
//!   removal listener, shutdown
//! - **`MarkerStore`**: ordered marker collection, every mutation reconciled
//!   with the persistent snapshot
//! - **`GeolocationEngine`**: one-shot / interval / watch acquisition modes,
//!   single active handle
//! - **`StartPreferenceFlow`**: per-fix read-decide-write over the persisted
//!   start preference
//! - **`EngineConfig`**: environment-based configuration
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use waymark_engine::{EngineConfig, Session};
//! use waymark_gateways::{StubDialog, StubGeolocation, StubMapView};
//! use waymark_store::MemoryKvStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let session = Session::bootstrap(
//!         EngineConfig::default(),
//!         Arc::new(MemoryKvStore::new()),
//!         Arc::new(StubGeolocation::new()),
//!         Arc::new(StubMapView::new()),
//!         Arc::new(StubDialog::new()),
//!     )
//!     .await;
//!
//!     session.locator().locate().await;
//!     session.shutdown().await;
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod locator;
pub mod markers;
pub mod preference;
pub mod session;

// Re-exports for convenience
pub use config::{ConfigError, EngineConfig, PromptPolicy};
pub use locator::{GeolocationEngine, ModeKind};
pub use markers::{MarkerStore, RemoveRequest};
pub use preference::StartPreferenceFlow;
pub use session::Session;
