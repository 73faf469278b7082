//! Record Stores
//! Mission: Durable journals for trade and tax calculations
//!
//! Both stores run on the same generic engine ([`RecordStore`]) and differ only
//! in their [`RecordKind`] descriptor. They share nothing at runtime: separate
//! connections, separate snapshot slots, no cross-store ordering.

pub mod engine;
pub mod schema;
pub mod tax;
pub mod trade;

pub use engine::RecordStore;
pub use schema::RecordKind;
pub use tax::{TaxRecord, TaxStore, TaxSummary};
pub use trade::{TradeRecord, TradeStatistics, TradeStore};

use crate::error::Result;
use crate::snapshot::{FileSlot, SnapshotSlot};
use std::path::PathBuf;
use std::sync::Arc;

/// The pair of stores a session works with
pub struct Journal {
    pub trades: TradeStore,
    pub taxes: TaxStore,
}

impl Journal {
    /// Build both stores over one slot backend (their keys never collide)
    pub fn new(slot: Arc<dyn SnapshotSlot>) -> Self {
        Self {
            trades: TradeStore::new(slot.clone()),
            taxes: TaxStore::new(slot),
        }
    }

    /// Journal persisted as files under `dir`
    pub fn open_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileSlot::new(dir)))
    }

    /// Initialize both stores up front instead of on first use
    pub async fn init(&self) -> Result<()> {
        self.trades.init().await?;
        self.taxes.init().await
    }
}
