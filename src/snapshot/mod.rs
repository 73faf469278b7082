//! Snapshot Persistence
//! Mission: Move a store's full binary image in and out of a durable text slot
//!
//! The adapter never looks inside the image. Every write replaces the whole
//! slot, so the last successful write wins.

mod file_slot;
mod memory_slot;

pub use file_slot::FileSlot;
pub use memory_slot::MemorySlot;

use crate::error::{Result, StoreError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Durable named text slot (one per store kind)
#[async_trait]
pub trait SnapshotSlot: Send + Sync {
    /// Read the slot, `None` if it has never been written
    async fn read(&self, key: &str) -> std::io::Result<Option<String>>;

    /// Replace the slot contents
    async fn write(&self, key: &str, text: &str) -> std::io::Result<()>;
}

/// Encodes a byte image as a JSON array of numbers
pub fn encode(image: &[u8]) -> Result<String> {
    Ok(serde_json::to_string(image)?)
}

/// Inverse of [`encode`]
pub fn decode(text: &str) -> std::result::Result<Vec<u8>, serde_json::Error> {
    serde_json::from_str(text)
}

/// Binds one slot key to a slot backend
#[derive(Clone)]
pub struct SnapshotAdapter {
    slot: Arc<dyn SnapshotSlot>,
    key: &'static str,
}

impl SnapshotAdapter {
    pub fn new(slot: Arc<dyn SnapshotSlot>, key: &'static str) -> Self {
        Self { slot, key }
    }

    /// Load the stored image. A slot holding undecodable text is corrupt, not empty.
    pub async fn load(&self) -> Result<Option<Vec<u8>>> {
        let text = self.slot.read(self.key).await.map_err(|source| StoreError::Slot {
            slot: self.key.to_string(),
            source,
        })?;

        let Some(text) = text else {
            return Ok(None);
        };

        let image = decode(&text).map_err(|e| StoreError::CorruptSnapshot {
            slot: self.key.to_string(),
            reason: format!("slot text is not a byte array: {}", e),
        })?;

        debug!(slot = self.key, bytes = image.len(), "Snapshot loaded");
        Ok(Some(image))
    }

    /// Overwrite the slot with a new image; completes only once the slot is written
    pub async fn save(&self, image: &[u8]) -> Result<()> {
        let text = encode(image)?;
        self.slot
            .write(self.key, &text)
            .await
            .map_err(|source| StoreError::Slot {
                slot: self.key.to_string(),
                source,
            })?;

        debug!(slot = self.key, bytes = image.len(), "💾 Snapshot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_is_numeric_array() {
        let text = encode(&[0, 1, 255]).unwrap();
        assert_eq!(text, "[0,1,255]");
        assert_eq!(decode(&text).unwrap(), vec![0, 1, 255]);
        assert!(decode("[256]").is_err());
        assert!(decode("not json").is_err());
    }

    #[tokio::test]
    async fn test_absent_slot_loads_none() {
        let adapter = SnapshotAdapter::new(Arc::new(MemorySlot::new()), "emptyDB");
        assert!(adapter.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let slot = Arc::new(MemorySlot::new());
        let adapter = SnapshotAdapter::new(slot.clone(), "someDB");
        adapter.save(&[1, 2, 3]).await.unwrap();

        assert_eq!(slot.get("someDB").as_deref(), Some("[1,2,3]"));
        assert_eq!(adapter.load().await.unwrap(), Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_garbage_slot_is_corrupt() {
        let slot = Arc::new(MemorySlot::new());
        slot.put("someDB", "{\"oops\":true}");
        let adapter = SnapshotAdapter::new(slot, "someDB");

        let err = adapter.load().await.unwrap_err();
        assert!(err.is_corrupt_snapshot());
    }

    #[tokio::test]
    async fn test_write_failure_surfaces() {
        let slot = Arc::new(MemorySlot::new());
        slot.set_fail_writes(true);
        let adapter = SnapshotAdapter::new(slot, "someDB");

        let err = adapter.save(&[1]).await.unwrap_err();
        assert!(matches!(err, StoreError::Slot { .. }));
    }
}
