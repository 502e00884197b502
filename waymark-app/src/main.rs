//! Waymark demo harness.
//!
//! Runs a short simulated session over the stub gateways: acquire a fix,
//! answer the start-location prompt, place a marker, watch the sensor for a
//! moment, then shut down. Useful for watching the engine's log output
//! without a real platform underneath.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p waymark-app
//! ```
//!
//! # Environment Variables
//!
//! - `WAYMARK_POLL_INTERVAL_MS`: interval-mode period (default: 750)
//! - `WAYMARK_WATCH_TIMEOUT_MS`: per-update watch timeout (default: 5000)
//! - `WAYMARK_PROMPT_DEBOUNCE_MS`: recenter-to-prompt delay (default: 500)
//! - `WAYMARK_PROMPT_POLICY`: once | every-fix (default: once)

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use waymark_domain::{Coordinate, PositionFix};
use waymark_engine::{EngineConfig, Session};
use waymark_gateways::{StubDialog, StubGeolocation, StubMapView};
use waymark_store::MemoryKvStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (ignore errors)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load configuration
    let config = EngineConfig::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        prompt_debounce_ms = config.prompt_debounce.as_millis() as u64,
        "Waymark demo session"
    );

    // Stub gateways playing the platform
    let kv = Arc::new(MemoryKvStore::new());
    let sensor = Arc::new(StubGeolocation::new());
    let view = Arc::new(StubMapView::new());
    let dialog = Arc::new(StubDialog::new());

    // Script the user: one fix, "yes please" to the start prompt, and a
    // titled marker on the simulated map click
    sensor.push_position(PositionFix::new(Coordinate::new(51.5, -0.12)?));
    dialog.push_confirm(true);
    dialog.push_prompt(Some("Dropped pin"));

    let session = Session::bootstrap(
        config.clone(),
        kv.clone(),
        sensor.clone(),
        view.clone(),
        dialog.clone(),
    )
    .await;

    // One-shot acquisition, then wait out the debounced confirmation
    session.locator().locate().await;
    tokio::time::sleep(config.prompt_debounce + Duration::from_millis(100)).await;

    // The user taps the map and confirms a title
    session.handle_map_click(Coordinate::new(51.501, -0.125)?).await;

    // A short continuous watch with two simulated updates
    session.locator().clone().listen().await;
    sensor.inject_fix(PositionFix::new(Coordinate::new(51.502, -0.126)?)).await;
    sensor.inject_fix(PositionFix::new(Coordinate::new(51.503, -0.127)?)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    session.locator().stop_listening().await;

    info!(
        markers = session.markers().len().await,
        start_at_last_location = session.preference().start_at_last_location(),
        viewport_changes = view.viewports().len(),
        persisted_keys = kv.len(),
        "Simulated session finished"
    );

    session.shutdown().await;

    Ok(())
}
