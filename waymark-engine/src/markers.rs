//! Marker Store: the in-memory marker collection and its reconciliation
//! with the persistent backing store.
//!
//! Every mutation (create, remove, clear) ends in a wholesale snapshot write.
//! The collection is rebuilt from the snapshot on startup via
//! [`MarkerStore::rehydrate`], which also reconstructs the rendered view
//! handle of every stored marker.

use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

use waymark_domain::{Coordinate, Marker};
use waymark_gateways::{MapViewPort, MarkerView, RemoveCallback};
use waymark_store::StateStore;

// =============================================================================
// Remove Requests
// =============================================================================

/// Removal request emitted by a marker's rendered affordance.
///
/// Carries the literal identity tuple the affordance was bound to at
/// creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveRequest {
    /// Latitude bound at creation time
    pub lat: f64,
    /// Longitude bound at creation time
    pub lng: f64,
    /// Title bound at creation time
    pub title: String,
}

// =============================================================================
// Marker Store
// =============================================================================

/// A live marker: the persisted record plus its rendered view handle.
///
/// `view` is `None` when rendering failed; the marker is still persisted and
/// the inconsistency is corrected on the next rehydrate.
struct MarkerEntry {
    marker: Marker,
    view: Option<Box<dyn MarkerView>>,
}

/// Ordered marker collection with persistent reconciliation.
pub struct MarkerStore {
    entries: RwLock<Vec<MarkerEntry>>,
    state: StateStore,
    view: Arc<dyn MapViewPort>,
    remove_tx: mpsc::UnboundedSender<RemoveRequest>,
}

impl MarkerStore {
    /// Create an empty store.
    ///
    /// Returns the store together with the stream of removal requests its
    /// marker affordances will emit; the session services that stream.
    pub fn new(
        state: StateStore,
        view: Arc<dyn MapViewPort>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<RemoveRequest>) {
        let (remove_tx, remove_rx) = mpsc::unbounded_channel();
        let store = Arc::new(Self {
            entries: RwLock::new(Vec::new()),
            state,
            view,
            remove_tx,
        });
        (store, remove_rx)
    }

    /// Create a marker, render it, append it, and persist the collection.
    ///
    /// A render failure is logged and swallowed: the marker is kept in memory
    /// without a view handle and still persisted.
    pub async fn create(&self, coord: Coordinate, title: &str) -> Marker {
        let marker = Marker::new(coord, title);
        let view = self.render(&marker);

        {
            let mut entries = self.entries.write().await;
            entries.push(MarkerEntry {
                marker: marker.clone(),
                view,
            });
        }

        self.persist().await;
        marker
    }

    /// Remove the first marker whose identity tuple matches exactly.
    ///
    /// A stale request (no matching marker) is a no-op, not an error.
    pub async fn remove_one(&self, lat: f64, lng: f64, title: &str) {
        let removed = {
            let mut entries = self.entries.write().await;
            match entries.iter().position(|e| e.marker.matches(lat, lng, title)) {
                Some(index) => {
                    let entry = entries.remove(index);
                    if let Some(view) = entry.view {
                        view.detach();
                    }
                    true
                }
                None => false,
            }
        };

        if removed {
            self.persist().await;
        } else {
            debug!(lat, lng, title, "No matching marker, ignoring stale removal");
        }
    }

    /// Detach every view handle, empty the collection, and persist.
    pub async fn clear_all(&self) {
        {
            let mut entries = self.entries.write().await;
            for entry in entries.drain(..) {
                if let Some(view) = entry.view {
                    view.detach();
                }
            }
        }

        self.persist().await;
    }

    /// Rebuild the collection from the persisted snapshot.
    ///
    /// This is the sole startup repopulation path and must run after the map
    /// surface is ready. An absent or malformed snapshot leaves the
    /// collection empty; it is never a fatal error.
    pub async fn rehydrate(&self) {
        let records = match self.state.load_markers().await {
            Ok(Some(records)) => records,
            Ok(None) => {
                debug!("No marker snapshot stored");
                return;
            }
            Err(e) if e.is_malformed() => {
                warn!(error = %e, "Malformed marker snapshot, starting empty");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Could not load marker snapshot, starting empty");
                return;
            }
        };

        let mut rebuilt = Vec::with_capacity(records.len());
        for marker in records {
            let view = self.render(&marker);
            rebuilt.push(MarkerEntry { marker, view });
        }

        let count = rebuilt.len();
        *self.entries.write().await = rebuilt;
        debug!(count, "Rehydrated markers from snapshot");
    }

    /// Number of live markers.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the collection is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Snapshot of the marker records, in collection order.
    pub async fn markers(&self) -> Vec<Marker> {
        self.entries
            .read()
            .await
            .iter()
            .map(|e| e.marker.clone())
            .collect()
    }

    /// Whether the marker at `index` currently has a rendered view handle.
    pub async fn has_view(&self, index: usize) -> bool {
        self.entries
            .read()
            .await
            .get(index)
            .map(|e| e.view.is_some())
            .unwrap_or(false)
    }

    /// Write the collection wholesale, view handles stripped.
    ///
    /// Write failures are logged and non-fatal; in-memory state remains
    /// authoritative until the next successful write or restart.
    async fn persist(&self) {
        let snapshot = self.markers().await;
        if let Err(e) = self.state.save_markers(&snapshot).await {
            warn!(error = %e, "Could not save marker snapshot");
        }
    }

    /// Render a marker overlay with its removal affordance bound to the
    /// literal identity tuple.
    fn render(&self, marker: &Marker) -> Option<Box<dyn MarkerView>> {
        let on_remove: RemoveCallback = {
            let tx = self.remove_tx.clone();
            let request = RemoveRequest {
                lat: marker.lat,
                lng: marker.lng,
                title: marker.title.clone(),
            };
            Arc::new(move || {
                // The session may already be gone; a dropped receiver is fine
                let _ = tx.send(request.clone());
            })
        };

        match self
            .view
            .create_marker_view(marker.coordinate(), &marker.title, on_remove)
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(
                    lat = marker.lat,
                    lng = marker.lng,
                    title = %marker.title,
                    error = %e,
                    "Could not render marker, keeping it without a view handle"
                );
                None
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
