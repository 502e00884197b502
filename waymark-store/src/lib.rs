//! Waymark Storage Layer
//!
//! Persistence for markers and the start-location preference.
//!
//! # Architecture
//!
//! - **`KeyValueStore` trait**: the persistent-store port (async get/set of
//!   named JSON values)
//! - **`MemoryKvStore`**: in-process implementation for tests and the demo
//!   harness
//! - **`StateStore`**: typed snapshot access on top of any `KeyValueStore`
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use waymark_domain::{Coordinate, Marker};
//! use waymark_store::{MemoryKvStore, StateStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let kv = Arc::new(MemoryKvStore::new());
//!     let state = StateStore::new(kv);
//!
//!     let marker = Marker::new(Coordinate::new(51.5, -0.12).unwrap(), "Home");
//!     state.save_markers(&[marker]).await.unwrap();
//!
//!     let loaded = state.load_markers().await.unwrap().unwrap();
//!     assert_eq!(loaded.len(), 1);
//! }
//! ```

#![warn(clippy::all)]

// Modules
mod error;
mod kv;
mod memory;
mod state;

// Re-exports
pub use error::StoreError;
pub use kv::{keys, KeyValueStore};
pub use memory::MemoryKvStore;
pub use state::StateStore;
