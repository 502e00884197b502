//! Session: the explicit per-run context.
//!
//! Owns the engine, the marker store, and the preference flow, and wires
//! them to the gateway capabilities. Bootstrap order matters: the start
//! preference decides the initial viewport before anything is rendered, and
//! markers are rehydrated only once the view surface is ready.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use waymark_domain::Coordinate;
use waymark_gateways::{DialogPort, GeolocationPort, MapViewPort};
use waymark_store::{KeyValueStore, StateStore};

use crate::config::EngineConfig;
use crate::locator::GeolocationEngine;
use crate::markers::{MarkerStore, RemoveRequest};
use crate::preference::StartPreferenceFlow;

/// Question shown when placing a marker on a map click.
const TITLE_MESSAGE: &str = "To place a marker here, please enter a title:";

// =============================================================================
// Session
// =============================================================================

/// One live application session.
pub struct Session {
    markers: Arc<MarkerStore>,
    locator: Arc<GeolocationEngine>,
    preference: Arc<StartPreferenceFlow>,
    dialog: Arc<dyn DialogPort>,
    shutdown: CancellationToken,
    remove_task: JoinHandle<()>,
}

impl Session {
    /// Build and start a session.
    ///
    /// Reads the persisted start preference for the initial viewport, then
    /// rehydrates the marker collection onto the ready view surface. Every
    /// I/O failure on this path is logged and degraded, never propagated.
    pub async fn bootstrap(
        config: EngineConfig,
        kv: Arc<dyn KeyValueStore>,
        sensor: Arc<dyn GeolocationPort>,
        view: Arc<dyn MapViewPort>,
        dialog: Arc<dyn DialogPort>,
    ) -> Self {
        let state = StateStore::new(kv);

        let (center, zoom) = match state.load_preference().await {
            Ok(Some(pref)) if pref.is_usable() => {
                info!("Starting at the remembered location");
                (pref.latlng.unwrap_or(config.default_center), config.recenter_zoom)
            }
            Ok(_) => (config.default_center, config.default_zoom),
            Err(e) => {
                warn!(error = %e, "Could not read start preference, using default viewport");
                (config.default_center, config.default_zoom)
            }
        };
        view.set_viewport(center, zoom);

        let preference = Arc::new(StartPreferenceFlow::new(
            state.clone(),
            dialog.clone(),
            config.prompt_policy,
        ));

        let (markers, remove_rx) = MarkerStore::new(state, view.clone());
        markers.rehydrate().await;

        let locator = Arc::new(GeolocationEngine::new(
            sensor,
            view,
            preference.clone(),
            config,
        ));

        let shutdown = CancellationToken::new();
        let remove_task = Self::spawn_remove_listener(markers.clone(), remove_rx, shutdown.clone());

        info!("Session ready");
        Self {
            markers,
            locator,
            preference,
            dialog,
            shutdown,
            remove_task,
        }
    }

    /// The marker collection.
    pub fn markers(&self) -> &Arc<MarkerStore> {
        &self.markers
    }

    /// The acquisition state machine.
    pub fn locator(&self) -> &Arc<GeolocationEngine> {
        &self.locator
    }

    /// The start-location preference flow.
    pub fn preference(&self) -> &Arc<StartPreferenceFlow> {
        &self.preference
    }

    /// Place a marker at a clicked coordinate.
    ///
    /// Prompts for a title; cancellation or an empty answer aborts creation
    /// with a toast.
    pub async fn handle_map_click(&self, coord: Coordinate) {
        let answer = match self.dialog.prompt_text(TITLE_MESSAGE).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Could not prompt for a marker title");
                return;
            }
        };

        match answer.filter(|title| !title.is_empty()) {
            Some(title) => {
                self.markers.create(coord, &title).await;
            }
            None => {
                self.dialog.toast("Cancelled marker creation.").await;
            }
        }
    }

    /// Remove every marker (the clear-button path).
    pub async fn clear_all_markers(&self) {
        self.markers.clear_all().await;
    }

    /// Stop acquisition and the session's background tasks.
    pub async fn shutdown(self) {
        self.locator.stop_listening().await;
        self.shutdown.cancel();
        let _ = self.remove_task.await;
        info!("Session shut down");
    }

    /// Service removal requests coming back from rendered marker
    /// affordances.
    fn spawn_remove_listener(
        markers: Arc<MarkerStore>,
        mut remove_rx: mpsc::UnboundedReceiver<RemoveRequest>,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    request = remove_rx.recv() => match request {
                        Some(request) => {
                            markers
                                .remove_one(request.lat, request.lng, &request.title)
                                .await;
                        }
                        None => break,
                    }
                }
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
