//! In-memory store implementation
//!
//! Used for testing and development without a real persistence backend.
//! Thread-safe using RwLock for concurrent access.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::kv::KeyValueStore;

/// In-memory key-value store for testing
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, Value>>,
    /// Successful writes per key, for asserting snapshot counts in tests
    write_counts: RwLock<HashMap<String, u64>>,
    /// Whether to simulate failures
    fail_next: RwLock<bool>,
}

impl MemoryKvStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            write_counts: RwLock::new(HashMap::new()),
            fail_next: RwLock::new(false),
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Number of successful writes observed for a key
    pub fn write_count(&self, key: &str) -> u64 {
        self.write_counts.read().unwrap().get(key).copied().unwrap_or(0)
    }

    /// Peek at the raw stored value without going through the async trait
    pub fn raw(&self, key: &str) -> Option<Value> {
        self.entries.read().unwrap().get(key).cloned()
    }

    /// Seed a raw value directly (test setup, including malformed shapes)
    pub fn seed(&self, key: &str, value: Value) {
        self.entries.write().unwrap().insert(key.to_string(), value);
    }

    /// Configure the next operation to fail
    pub fn set_fail_next(&self, fail: bool) {
        let mut fail_next = self.fail_next.write().unwrap();
        *fail_next = fail;
    }

    /// Check if we should fail the next operation
    fn should_fail(&self) -> bool {
        let mut fail_next = self.fail_next.write().unwrap();
        let fail = *fail_next;
        *fail_next = false; // Reset after check
        fail
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        if self.should_fail() {
            return Err(StoreError::read(key, "Simulated read failure"));
        }

        let entries = self.entries.read().unwrap();
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        if self.should_fail() {
            return Err(StoreError::write(key, "Simulated write failure"));
        }

        let mut entries = self.entries.write().unwrap();
        entries.insert(key.to_string(), value);

        let mut counts = self.write_counts.write().unwrap();
        *counts.entry(key.to_string()).or_insert(0) += 1;

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
