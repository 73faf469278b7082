//! Record store error types

use thiserror::Error;

/// Result type for record store and snapshot operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A snapshot exists in the slot but cannot be restored
    #[error("Corrupt snapshot in slot '{slot}': {reason}")]
    CorruptSnapshot { slot: String, reason: String },

    #[error("Snapshot slot '{slot}' I/O failed: {source}")]
    Slot {
        slot: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_corrupt_snapshot(&self) -> bool {
        matches!(self, StoreError::CorruptSnapshot { .. })
    }
}
