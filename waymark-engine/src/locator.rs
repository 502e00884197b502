//! Geolocation Engine: the acquisition state machine.
//!
//! Wraps the sensor port behind a single current-mode state machine with
//! three acquisition modes (one-shot, fixed-period polling, continuous
//! watch). At most one acquisition handle is active at a time; every mode
//! entry tears down whatever handle came before it.
//!
//! Every delivered fix, regardless of mode, routes through the same
//! fix-handler: recenter the viewport, then (after a short debounce) run the
//! start-location preference flow.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use waymark_domain::PositionFix;
use waymark_gateways::{GeoError, GeolocationPort, MapViewPort, WatchId};

use crate::config::EngineConfig;
use crate::preference::StartPreferenceFlow;

// =============================================================================
// Acquisition Mode
// =============================================================================

/// Observable acquisition mode, for tests and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    /// No acquisition in progress
    Idle,
    /// A single position request is in flight
    OneShot,
    /// One-shot requests are being issued on a fixed period
    Interval,
    /// A continuous sensor watch is delivering fixes
    Watching,
}

/// Internal mode state, carrying the active handle.
enum AcquisitionMode {
    Idle,
    OneShot,
    Interval {
        cancel: CancellationToken,
        task: JoinHandle<()>,
    },
    Watching {
        watch_id: WatchId,
        cancel: CancellationToken,
        task: JoinHandle<()>,
    },
}

// =============================================================================
// Geolocation Engine
// =============================================================================

/// Single-owner acquisition state machine over the sensor port.
pub struct GeolocationEngine {
    sensor: Arc<dyn GeolocationPort>,
    view: Arc<dyn MapViewPort>,
    preference: Arc<StartPreferenceFlow>,
    config: EngineConfig,
    mode: Mutex<AcquisitionMode>,
}

impl GeolocationEngine {
    /// Create an idle engine.
    pub fn new(
        sensor: Arc<dyn GeolocationPort>,
        view: Arc<dyn MapViewPort>,
        preference: Arc<StartPreferenceFlow>,
        config: EngineConfig,
    ) -> Self {
        Self {
            sensor,
            view,
            preference,
            config,
            mode: Mutex::new(AcquisitionMode::Idle),
        }
    }

    /// Issue exactly one position request.
    ///
    /// From idle, the engine is in one-shot mode for the duration of the
    /// request; from any other mode the request runs without touching mode
    /// state (interval ticks come through here too).
    pub async fn locate(&self) {
        if self.unsupported() {
            return;
        }

        let entered = {
            let mut mode = self.mode.lock().await;
            if matches!(*mode, AcquisitionMode::Idle) {
                *mode = AcquisitionMode::OneShot;
                true
            } else {
                false
            }
        };

        self.request_fix().await;

        if entered {
            let mut mode = self.mode.lock().await;
            if matches!(*mode, AcquisitionMode::OneShot) {
                *mode = AcquisitionMode::Idle;
            }
        }
    }

    /// Schedule an independent one-shot request on a fixed period.
    ///
    /// Ticks do not deduplicate overlapping requests; the period is expected
    /// to exceed the sensor round-trip. Tick failures are logged and the
    /// loop retries on the next tick.
    pub async fn listen_interval(self: Arc<Self>) {
        if self.unsupported() {
            return;
        }

        let mut mode = self.mode.lock().await;
        Self::teardown(&mut mode, &self.sensor).await;

        let cancel = CancellationToken::new();
        let task = {
            let engine = self.clone();
            let cancel = cancel.clone();
            let period = self.config.poll_interval;
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(period) => {
                            engine.request_fix().await;
                        }
                    }
                }
            })
        };

        *mode = AcquisitionMode::Interval { cancel, task };
        info!(
            period_ms = self.config.poll_interval.as_millis() as u64,
            "Interval acquisition started"
        );
    }

    /// Start a continuous sensor watch.
    ///
    /// Unconditionally tears down any prior interval or watch handle before
    /// starting the new one. Per-update failures are logged and the watch
    /// continues; only clearing the watch (or the stream ending) stops it.
    pub async fn listen(self: Arc<Self>) {
        if self.unsupported() {
            return;
        }

        let mut mode = self.mode.lock().await;
        Self::teardown(&mut mode, &self.sensor).await;

        let (watch_id, mut stream) = match self
            .sensor
            .watch_position(self.config.watch_options)
            .await
        {
            Ok(started) => started,
            Err(e) => {
                error!(kind = e.kind(), error = %e, "Could not start continuous watch");
                return;
            }
        };

        let cancel = CancellationToken::new();
        let task = {
            let engine = self.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        update = stream.recv() => match update {
                            Some(Ok(fix)) => engine.handle_fix(fix),
                            Some(Err(e)) => {
                                error!(kind = e.kind(), error = %e, "Watch update failed");
                            }
                            None => {
                                warn!(watch_id, "Watch stream ended");
                                engine.watch_ended(watch_id).await;
                                break;
                            }
                        }
                    }
                }
            })
        };

        *mode = AcquisitionMode::Watching {
            watch_id,
            cancel,
            task,
        };
        info!(watch_id, "Continuous watch started");
    }

    /// Cancel whatever acquisition handle is active.
    ///
    /// Safe and idempotent when the engine is already idle.
    pub async fn stop_listening(&self) {
        let mut mode = self.mode.lock().await;
        if matches!(*mode, AcquisitionMode::Idle) {
            debug!("Engine already idle");
            return;
        }

        Self::teardown(&mut mode, &self.sensor).await;
        info!("Acquisition stopped");
    }

    /// The current acquisition mode.
    pub async fn mode(&self) -> ModeKind {
        match &*self.mode.lock().await {
            AcquisitionMode::Idle => ModeKind::Idle,
            AcquisitionMode::OneShot => ModeKind::OneShot,
            AcquisitionMode::Interval { .. } => ModeKind::Interval,
            AcquisitionMode::Watching { .. } => ModeKind::Watching,
        }
    }

    /// Check availability; log the classified no-op when the capability is
    /// absent.
    fn unsupported(&self) -> bool {
        if self.sensor.available() {
            return false;
        }
        warn!(
            kind = GeoError::Unsupported.kind(),
            "Geolocation is not supported, ignoring acquisition request"
        );
        true
    }

    /// Issue one position request and route the outcome.
    async fn request_fix(&self) {
        match self.sensor.current_position().await {
            Ok(fix) => self.handle_fix(fix),
            Err(e) => {
                error!(kind = e.kind(), error = %e, "Could not access location services");
            }
        }
    }

    /// Shared fix-handler for every acquisition mode.
    ///
    /// Recenters immediately; the preference flow runs after a debounce so
    /// the recenter animation is decoupled from the confirmation dialog.
    fn handle_fix(&self, fix: PositionFix) {
        debug!(lat = fix.coord.lat, lng = fix.coord.lng, "Fix acquired, recentering");
        self.view.set_viewport(fix.coord, self.config.recenter_zoom);

        let preference = self.preference.clone();
        let debounce = self.config.prompt_debounce;
        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            preference.on_fix(fix).await;
        });
    }

    /// Reset to idle after the sensor closed the watch stream on its own.
    async fn watch_ended(&self, ended_id: WatchId) {
        let mut mode = self.mode.lock().await;
        if let AcquisitionMode::Watching { watch_id, .. } = &*mode {
            if *watch_id == ended_id {
                *mode = AcquisitionMode::Idle;
            }
        }
    }

    /// Cancel and drop the active handle, if any.
    async fn teardown(mode: &mut AcquisitionMode, sensor: &Arc<dyn GeolocationPort>) {
        match std::mem::replace(mode, AcquisitionMode::Idle) {
            AcquisitionMode::Idle | AcquisitionMode::OneShot => {}
            AcquisitionMode::Interval { cancel, task } => {
                cancel.cancel();
                task.abort();
                debug!("Interval acquisition cancelled");
            }
            AcquisitionMode::Watching {
                watch_id,
                cancel,
                task,
            } => {
                cancel.cancel();
                task.abort();
                sensor.clear_watch(watch_id).await;
                debug!(watch_id, "Continuous watch cancelled");
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
