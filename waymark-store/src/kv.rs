//! Key-value store trait definition (Port)
//!
//! This trait defines the persistent-store interface the engine writes
//! through. Implementations can be an embedded database, browser-style
//! storage behind FFI, or in-memory for testing.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// Keys used by the engine in the backing store.
pub mod keys {
    /// Sequence of `{lat, lng, title}` marker records
    pub const MARKERS: &str = "markers";
    /// `{startHere, latlng?}` start-location preference singleton
    pub const START_AT_LAST_LOCATION: &str = "startAtLastLocation";
}

/// Asynchronous named-value persistence.
///
/// Values are structured JSON. `set` has overwrite semantics: every call
/// replaces whatever was stored under the key before.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Store `value` under `key`, replacing any prior value.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}
