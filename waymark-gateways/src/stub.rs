//! Stub implementations for testing.
//!
//! These adapters simulate the sensor, view surface, and dialog widgets
//! without a real platform underneath. Tests script their behavior and
//! inspect what the engine did to them.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use waymark_domain::{Coordinate, PositionFix};

use crate::error::{DialogError, GeoError, ViewError};
use crate::ports::{
    DialogPort, GeolocationPort, MapViewPort, MarkerView, RemoveCallback, WatchId, WatchOptions,
    WatchStream,
};

// =============================================================================
// Stub Geolocation
// =============================================================================

/// Stub position sensor.
///
/// One-shot requests consume a scripted queue of results; watches receive
/// whatever the test injects.
pub struct StubGeolocation {
    /// Capability flag reported to the engine
    available: bool,
    /// Scripted one-shot results, consumed front to back
    one_shot: RwLock<VecDeque<Result<PositionFix, GeoError>>>,
    /// Active watch subscriptions (watch id -> sender)
    watchers: RwLock<HashMap<WatchId, mpsc::Sender<Result<PositionFix, GeoError>>>>,
    /// Watch id counter
    next_watch_id: AtomicU64,
    /// Options the engine passed to the most recent watch
    last_options: RwLock<Option<WatchOptions>>,
    /// One-shot requests observed (scripted or not)
    request_count: AtomicU64,
}

impl StubGeolocation {
    /// Create a stub sensor that reports itself available.
    pub fn new() -> Self {
        Self {
            available: true,
            one_shot: RwLock::new(VecDeque::new()),
            watchers: RwLock::new(HashMap::new()),
            next_watch_id: AtomicU64::new(0),
            last_options: RwLock::new(None),
            request_count: AtomicU64::new(0),
        }
    }

    /// Create a stub sensor that reports the capability as absent.
    pub fn unsupported() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Script the next one-shot result as a successful fix.
    pub fn push_position(&self, fix: PositionFix) {
        self.one_shot.write().unwrap().push_back(Ok(fix));
    }

    /// Script the next one-shot result as a classified failure.
    pub fn push_error(&self, error: GeoError) {
        self.one_shot.write().unwrap().push_back(Err(error));
    }

    /// Deliver a fix to every active watch subscription.
    pub async fn inject_fix(&self, fix: PositionFix) {
        let senders: Vec<_> = self.watchers.read().unwrap().values().cloned().collect();
        for sender in senders {
            // Ignore send errors (subscriber may have dropped)
            let _ = sender.send(Ok(fix)).await;
        }
    }

    /// Deliver a per-update failure to every active watch subscription.
    pub async fn inject_watch_error(&self, error: GeoError) {
        let senders: Vec<_> = self.watchers.read().unwrap().values().cloned().collect();
        for sender in senders {
            let _ = sender.send(Err(error.clone())).await;
        }
    }

    /// Number of watch subscriptions that have not been cleared.
    pub fn watcher_count(&self) -> usize {
        self.watchers.read().unwrap().len()
    }

    /// Number of one-shot requests the engine has issued.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Options passed to the most recent watch, if any was started.
    pub fn last_watch_options(&self) -> Option<WatchOptions> {
        *self.last_options.read().unwrap()
    }
}

impl Default for StubGeolocation {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeolocationPort for StubGeolocation {
    fn available(&self) -> bool {
        self.available
    }

    async fn current_position(&self) -> Result<PositionFix, GeoError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        let scripted = self.one_shot.write().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Err(GeoError::PositionUnavailable(
                "No scripted fix available".to_string(),
            ))
        })
    }

    async fn watch_position(
        &self,
        options: WatchOptions,
    ) -> Result<(WatchId, WatchStream), GeoError> {
        let (tx, rx) = mpsc::channel(100);

        let watch_id = self.next_watch_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.watchers.write().unwrap().insert(watch_id, tx);
        *self.last_options.write().unwrap() = Some(options);

        Ok((watch_id, rx))
    }

    async fn clear_watch(&self, watch_id: WatchId) {
        self.watchers.write().unwrap().remove(&watch_id);
        tracing::debug!(watch_id, "Stub: watch cleared");
    }
}

// =============================================================================
// Stub Map View
// =============================================================================

/// Record of a marker overlay created on the stub view surface.
struct StubViewRecord {
    lat: f64,
    lng: f64,
    title: String,
    detached: AtomicBool,
    on_remove: RemoveCallback,
}

impl StubViewRecord {
    fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }
}

struct StubMarkerView {
    record: Arc<StubViewRecord>,
}

impl MarkerView for StubMarkerView {
    fn detach(&self) {
        self.record.detached.store(true, Ordering::SeqCst);
    }
}

/// Stub view binding.
///
/// Records every viewport change and marker overlay, and lets tests invoke a
/// marker's removal affordance as if the user tapped it.
pub struct StubMapView {
    views: RwLock<Vec<Arc<StubViewRecord>>>,
    viewports: RwLock<Vec<(Coordinate, f64)>>,
    fail_next: RwLock<bool>,
}

impl StubMapView {
    /// Create a new stub view surface.
    pub fn new() -> Self {
        Self {
            views: RwLock::new(Vec::new()),
            viewports: RwLock::new(Vec::new()),
            fail_next: RwLock::new(false),
        }
    }

    /// Configure the next render call to fail.
    pub fn set_fail_next(&self, fail: bool) {
        let mut fail_next = self.fail_next.write().unwrap();
        *fail_next = fail;
    }

    /// Total overlays ever created (including since-detached ones).
    pub fn created_count(&self) -> usize {
        self.views.read().unwrap().len()
    }

    /// Overlays currently attached to the surface.
    pub fn live_count(&self) -> usize {
        self.views
            .read()
            .unwrap()
            .iter()
            .filter(|v| !v.is_detached())
            .count()
    }

    /// Every viewport change the engine requested, in order.
    pub fn viewports(&self) -> Vec<(Coordinate, f64)> {
        self.viewports.read().unwrap().clone()
    }

    /// The most recent viewport change, if any.
    pub fn last_viewport(&self) -> Option<(Coordinate, f64)> {
        self.viewports.read().unwrap().last().copied()
    }

    /// Invoke the removal affordance of the first live overlay matching the
    /// tuple, as the user would from the rendered marker.
    ///
    /// Returns whether a matching overlay was found.
    pub fn trigger_remove(&self, lat: f64, lng: f64, title: &str) -> bool {
        let record = {
            let views = self.views.read().unwrap();
            views
                .iter()
                .find(|v| !v.is_detached() && v.lat == lat && v.lng == lng && v.title == title)
                .cloned()
        };

        match record {
            Some(record) => {
                (record.on_remove)();
                true
            }
            None => false,
        }
    }

    fn should_fail(&self) -> bool {
        let mut fail_next = self.fail_next.write().unwrap();
        let fail = *fail_next;
        *fail_next = false; // Reset after check
        fail
    }
}

impl Default for StubMapView {
    fn default() -> Self {
        Self::new()
    }
}

impl MapViewPort for StubMapView {
    fn create_marker_view(
        &self,
        coord: Coordinate,
        title: &str,
        on_remove: RemoveCallback,
    ) -> Result<Box<dyn MarkerView>, ViewError> {
        if self.should_fail() {
            return Err(ViewError::Render("Simulated render failure".to_string()));
        }

        let record = Arc::new(StubViewRecord {
            lat: coord.lat,
            lng: coord.lng,
            title: title.to_string(),
            detached: AtomicBool::new(false),
            on_remove,
        });
        self.views.write().unwrap().push(record.clone());

        Ok(Box::new(StubMarkerView { record }))
    }

    fn set_viewport(&self, center: Coordinate, zoom: f64) {
        self.viewports.write().unwrap().push((center, zoom));
    }
}

// =============================================================================
// Stub Dialog
// =============================================================================

/// Stub dialog/toast widgets.
///
/// Answers come from scripted queues (defaulting to "No"/cancel when the
/// queue is empty). Confirmations can be held open to exercise overlapping
/// prompts.
pub struct StubDialog {
    confirms: RwLock<VecDeque<bool>>,
    prompts: RwLock<VecDeque<Option<String>>>,
    toasts: RwLock<Vec<String>>,
    confirm_count: AtomicU64,
    prompt_count: AtomicU64,
    fail_next: RwLock<bool>,
    hold_tx: watch::Sender<bool>,
}

impl StubDialog {
    /// Create a new stub dialog layer.
    pub fn new() -> Self {
        let (hold_tx, _) = watch::channel(false);
        Self {
            confirms: RwLock::new(VecDeque::new()),
            prompts: RwLock::new(VecDeque::new()),
            toasts: RwLock::new(Vec::new()),
            confirm_count: AtomicU64::new(0),
            prompt_count: AtomicU64::new(0),
            fail_next: RwLock::new(false),
            hold_tx,
        }
    }

    /// Script the next confirmation answer.
    pub fn push_confirm(&self, answer: bool) {
        self.confirms.write().unwrap().push_back(answer);
    }

    /// Script the next text-prompt answer (`None` = user cancelled).
    pub fn push_prompt(&self, answer: Option<&str>) {
        self.prompts
            .write()
            .unwrap()
            .push_back(answer.map(str::to_string));
    }

    /// Keep confirmation dialogs open until [`StubDialog::release_confirms`].
    pub fn hold_confirms(&self) {
        self.hold_tx.send_replace(true);
    }

    /// Resolve every held confirmation dialog.
    pub fn release_confirms(&self) {
        self.hold_tx.send_replace(false);
    }

    /// Configure the next dialog call to fail.
    pub fn set_fail_next(&self, fail: bool) {
        let mut fail_next = self.fail_next.write().unwrap();
        *fail_next = fail;
    }

    /// Number of confirmation dialogs shown.
    pub fn confirm_count(&self) -> u64 {
        self.confirm_count.load(Ordering::SeqCst)
    }

    /// Number of text prompts shown.
    pub fn prompt_count(&self) -> u64 {
        self.prompt_count.load(Ordering::SeqCst)
    }

    /// Every toast shown, in order.
    pub fn toasts(&self) -> Vec<String> {
        self.toasts.read().unwrap().clone()
    }

    fn should_fail(&self) -> bool {
        let mut fail_next = self.fail_next.write().unwrap();
        let fail = *fail_next;
        *fail_next = false; // Reset after check
        fail
    }

    async fn wait_while_held(&self) {
        let mut rx = self.hold_tx.subscribe();
        while *rx.borrow() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

impl Default for StubDialog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DialogPort for StubDialog {
    async fn confirm(&self, _message: &str) -> Result<bool, DialogError> {
        if self.should_fail() {
            return Err(DialogError::Failed("Simulated dialog failure".to_string()));
        }

        self.confirm_count.fetch_add(1, Ordering::SeqCst);
        self.wait_while_held().await;

        Ok(self.confirms.write().unwrap().pop_front().unwrap_or(false))
    }

    async fn prompt_text(&self, _message: &str) -> Result<Option<String>, DialogError> {
        if self.should_fail() {
            return Err(DialogError::Failed("Simulated dialog failure".to_string()));
        }

        self.prompt_count.fetch_add(1, Ordering::SeqCst);

        Ok(self.prompts.write().unwrap().pop_front().unwrap_or(None))
    }

    async fn toast(&self, message: &str) {
        tracing::debug!(message, "Stub: toast shown");
        self.toasts.write().unwrap().push(message.to_string());
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_domain::PositionFix;

    fn fix(lat: f64, lng: f64) -> PositionFix {
        PositionFix::new(Coordinate::new(lat, lng).unwrap())
    }

    #[tokio::test]
    async fn test_stub_geolocation_scripted_one_shot() {
        let sensor = StubGeolocation::new();
        sensor.push_position(fix(51.5, -0.12));

        let result = sensor.current_position().await.unwrap();
        assert_eq!(result.coord.lat, 51.5);

        // Queue exhausted: classified failure, not a panic
        let err = sensor.current_position().await.unwrap_err();
        assert_eq!(err.kind(), "POSITION_UNAVAILABLE");
        assert_eq!(sensor.request_count(), 2);
    }

    #[tokio::test]
    async fn test_stub_geolocation_watch_delivery() {
        let sensor = StubGeolocation::new();

        let (watch_id, mut stream) = sensor
            .watch_position(WatchOptions::default())
            .await
            .unwrap();
        assert_eq!(sensor.watcher_count(), 1);

        sensor.inject_fix(fix(48.8566, 2.3522)).await;
        let update = stream.recv().await.unwrap().unwrap();
        assert_eq!(update.coord.lng, 2.3522);

        sensor.clear_watch(watch_id).await;
        assert_eq!(sensor.watcher_count(), 0);

        // Cleared watch ends the stream
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stub_geolocation_watch_error() {
        let sensor = StubGeolocation::new();
        let (_, mut stream) = sensor
            .watch_position(WatchOptions::default())
            .await
            .unwrap();

        sensor
            .inject_watch_error(GeoError::Timeout("too slow".to_string()))
            .await;

        let update = stream.recv().await.unwrap();
        assert_eq!(update.unwrap_err().kind(), "TIMEOUT");
    }

    #[tokio::test]
    async fn test_stub_geolocation_unsupported() {
        let sensor = StubGeolocation::unsupported();
        assert!(!sensor.available());
    }

    #[test]
    fn test_stub_view_records_and_removal() {
        let view = StubMapView::new();
        let coord = Coordinate::new(51.5, -0.12).unwrap();

        let fired = Arc::new(AtomicBool::new(false));
        let on_remove: RemoveCallback = {
            let fired = fired.clone();
            Arc::new(move || fired.store(true, Ordering::SeqCst))
        };

        let handle = view.create_marker_view(coord, "Home", on_remove).unwrap();
        assert_eq!(view.created_count(), 1);
        assert_eq!(view.live_count(), 1);

        assert!(view.trigger_remove(51.5, -0.12, "Home"));
        assert!(fired.load(Ordering::SeqCst));

        handle.detach();
        assert_eq!(view.live_count(), 0);
        assert!(!view.trigger_remove(51.5, -0.12, "Home"));
    }

    #[test]
    fn test_stub_view_simulated_render_failure() {
        let view = StubMapView::new();
        let coord = Coordinate::new(0.0, 0.0).unwrap();

        view.set_fail_next(true);
        let result = view.create_marker_view(coord, "x", Arc::new(|| {}));
        assert!(result.is_err());

        // Next call should succeed
        let result = view.create_marker_view(coord, "x", Arc::new(|| {}));
        assert!(result.is_ok());
    }

    #[test]
    fn test_stub_view_viewports_in_order() {
        let view = StubMapView::new();
        let a = Coordinate::new(1.0, 1.0).unwrap();
        let b = Coordinate::new(2.0, 2.0).unwrap();

        view.set_viewport(a, 13.25);
        view.set_viewport(b, 12.0);

        assert_eq!(view.viewports().len(), 2);
        assert_eq!(view.last_viewport(), Some((b, 12.0)));
    }

    #[tokio::test]
    async fn test_stub_dialog_scripted_answers() {
        let dialog = StubDialog::new();
        dialog.push_confirm(true);
        dialog.push_prompt(Some("Home"));

        assert!(dialog.confirm("start here?").await.unwrap());
        assert_eq!(
            dialog.prompt_text("title?").await.unwrap(),
            Some("Home".to_string())
        );

        // Defaults when the scripts run dry
        assert!(!dialog.confirm("start here?").await.unwrap());
        assert_eq!(dialog.prompt_text("title?").await.unwrap(), None);

        assert_eq!(dialog.confirm_count(), 2);
        assert_eq!(dialog.prompt_count(), 2);
    }

    #[tokio::test]
    async fn test_stub_dialog_hold_and_release() {
        let dialog = Arc::new(StubDialog::new());
        dialog.push_confirm(true);
        dialog.hold_confirms();

        let pending = {
            let dialog = dialog.clone();
            tokio::spawn(async move { dialog.confirm("held?").await })
        };

        // The dialog is open but unresolved
        tokio::task::yield_now().await;
        assert_eq!(dialog.confirm_count(), 1);
        assert!(!pending.is_finished());

        dialog.release_confirms();
        assert!(pending.await.unwrap().unwrap());
    }

    #[tokio::test]
    async fn test_stub_dialog_toasts() {
        let dialog = StubDialog::new();
        dialog.toast("Cancelled marker creation.").await;

        assert_eq!(dialog.toasts(), vec!["Cancelled marker creation."]);
    }
}
