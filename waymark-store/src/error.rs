//! Storage layer errors

use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading a key from the backing store failed
    #[error("Read failed for key {key}: {message}")]
    Read {
        /// Key that was being read
        key: String,
        /// Backend error description
        message: String,
    },

    /// Writing a key to the backing store failed
    #[error("Write failed for key {key}: {message}")]
    Write {
        /// Key that was being written
        key: String,
        /// Backend error description
        message: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored data is present but not the expected shape
    #[error("Malformed snapshot under key {key}: {message}")]
    MalformedSnapshot {
        /// Key holding the malformed data
        key: String,
        /// What failed to decode
        message: String,
    },
}

impl StoreError {
    /// Create a read error
    pub fn read(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Read {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a write error
    pub fn write(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a malformed snapshot error
    pub fn malformed(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedSnapshot {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a malformed snapshot (treated as empty state by
    /// rehydration rather than as a fault).
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedSnapshot { .. })
    }
}
