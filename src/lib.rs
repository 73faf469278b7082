//! Futures Journal Library
//!
//! Futures profit/loss and Section 1256 tax calculators whose results are
//! journaled into embedded record stores, each persisted as a full snapshot
//! in a durable slot after every write.

pub mod calculator;
pub mod config;
pub mod contracts;
pub mod error;
pub mod snapshot;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{Journal, TaxRecord, TaxStore, TradeRecord, TradeStore};
