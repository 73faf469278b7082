//! In-process slot map, shared between clones

use super::SnapshotSlot;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Slot backend living in memory. Clones see the same slots, so a second store
/// built on a clone behaves like a fresh session against the same storage.
#[derive(Clone, Default)]
pub struct MemorySlot {
    slots: Arc<RwLock<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw slot text
    pub fn get(&self, key: &str) -> Option<String> {
        self.slots.read().get(key).cloned()
    }

    /// Set raw slot text, bypassing the adapter
    pub fn put(&self, key: &str, text: &str) {
        self.slots.write().insert(key.to_string(), text.to_string());
    }

    /// Make every subsequent write fail (simulates a full or revoked storage quota)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SnapshotSlot for MemorySlot {
    async fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, text: &str) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("write to slot '{}' rejected", key),
            ));
        }
        self.put(key, text);
        Ok(())
    }
}
