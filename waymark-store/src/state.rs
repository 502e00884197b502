//! Typed snapshot access on top of a `KeyValueStore`.
//!
//! Owns the wire shape of the two persisted records: the marker snapshot and
//! the start-location preference. Callers decide how to degrade on
//! `MalformedSnapshot`; this layer only classifies.

use std::sync::Arc;

use serde_json::Value;
use waymark_domain::{Marker, StartPreference};

use crate::error::StoreError;
use crate::kv::{keys, KeyValueStore};

/// Typed persistence facade for the engine.
#[derive(Clone)]
pub struct StateStore {
    kv: Arc<dyn KeyValueStore>,
}

impl StateStore {
    /// Wrap a key-value backend.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Write the full marker collection, replacing the prior snapshot.
    pub async fn save_markers(&self, markers: &[Marker]) -> Result<(), StoreError> {
        let value = serde_json::to_value(markers)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.kv.set(keys::MARKERS, value).await
    }

    /// Read the marker snapshot.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet and
    /// `Err(StoreError::MalformedSnapshot)` when data is present but is not a
    /// decodable sequence of marker records.
    pub async fn load_markers(&self) -> Result<Option<Vec<Marker>>, StoreError> {
        let Some(value) = self.kv.get(keys::MARKERS).await? else {
            return Ok(None);
        };

        if !value.is_array() {
            return Err(StoreError::malformed(keys::MARKERS, "expected a sequence"));
        }

        let markers = serde_json::from_value::<Vec<Marker>>(value)
            .map_err(|e| StoreError::malformed(keys::MARKERS, e.to_string()))?;
        Ok(Some(markers))
    }

    /// Write the start-location preference singleton.
    pub async fn save_preference(&self, pref: &StartPreference) -> Result<(), StoreError> {
        let value = serde_json::to_value(pref)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.kv.set(keys::START_AT_LAST_LOCATION, value).await
    }

    /// Read the start-location preference.
    ///
    /// Same absence/malformed classification as [`StateStore::load_markers`].
    pub async fn load_preference(&self) -> Result<Option<StartPreference>, StoreError> {
        let Some(value) = self.kv.get(keys::START_AT_LAST_LOCATION).await? else {
            return Ok(None);
        };

        decode_preference(value)
            .map(Some)
            .map_err(|message| StoreError::malformed(keys::START_AT_LAST_LOCATION, message))
    }
}

fn decode_preference(value: Value) -> Result<StartPreference, String> {
    serde_json::from_value(value).map_err(|e| e.to_string())
}

// =============================================================================
// Tests
// =============================================================================
