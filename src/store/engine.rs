//! Record Store Engine
//! Mission: One embedded SQLite image per record kind, snapshotted in full on every write
//!
//! Lifecycle:
//! - Uninitialized until the first operation (or an explicit `init`)
//! - Initialization restores the slot image, or creates the schema when the
//!   slot is absent; concurrent callers wait on the same in-flight attempt
//! - A failed initialization leaves the store Uninitialized so the next call retries
//!
//! Write path: mutate the in-memory image, serialize it, overwrite the slot.
//! The connection lock is held until the slot write finishes so snapshots land
//! in mutation order.

use super::schema::{self, RecordKind};
use crate::error::{Result, StoreError};
use crate::snapshot::{SnapshotAdapter, SnapshotSlot};
use chrono::{NaiveDate, SecondsFormat, Utc};
use rusqlite::serialize::OwnedData;
use rusqlite::types::Value;
use rusqlite::{ffi, params, params_from_iter, Connection, DatabaseName};
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

/// Persistence engine for one record kind
pub struct RecordStore<K: RecordKind> {
    adapter: SnapshotAdapter,
    conn: OnceCell<Mutex<Connection>>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: RecordKind> RecordStore<K> {
    /// Create an uninitialized store bound to `K::SLOT_KEY` in `slot`
    pub fn new(slot: Arc<dyn SnapshotSlot>) -> Self {
        Self {
            adapter: SnapshotAdapter::new(slot, K::SLOT_KEY),
            conn: OnceCell::new(),
            _kind: PhantomData,
        }
    }

    #[cfg(test)]
    fn is_ready(&self) -> bool {
        self.conn.initialized()
    }

    /// Restore or create the store. Idempotent.
    pub async fn init(&self) -> Result<()> {
        self.ready().await.map(|_| ())
    }

    async fn ready(&self) -> Result<&Mutex<Connection>> {
        self.conn.get_or_try_init(|| self.open()).await
    }

    async fn open(&self) -> Result<Mutex<Connection>> {
        match self.adapter.load().await? {
            Some(image) => {
                let conn = self.restore(&image)?;
                let count: i64 =
                    conn.query_row(&format!("SELECT COUNT(*) FROM {}", K::TABLE), [], |row| {
                        row.get(0)
                    })?;
                info!(
                    "📂 Restored {} ({} records, {} bytes)",
                    K::TABLE,
                    count,
                    image.len()
                );
                Ok(Mutex::new(conn))
            }
            None => {
                let conn = Connection::open_in_memory()?;
                conn.execute_batch(K::SCHEMA)?;
                // Persist the empty schema right away, like any other write
                let image = snapshot_image(&conn)?;
                self.adapter.save(&image).await?;
                info!("🆕 Created empty {} store", K::TABLE);
                Ok(Mutex::new(conn))
            }
        }
    }

    /// Load an image into a fresh in-memory connection and check it holds our table
    fn restore(&self, image: &[u8]) -> Result<Connection> {
        let corrupt = |reason: String| StoreError::CorruptSnapshot {
            slot: K::SLOT_KEY.to_string(),
            reason,
        };

        if image.is_empty() {
            return Err(corrupt("image is empty".to_string()));
        }

        let mut conn = Connection::open_in_memory()?;
        let data = owned_data(image)
            .ok_or_else(|| corrupt("could not allocate image buffer".to_string()))?;
        conn.deserialize(DatabaseName::Main, data, false)
            .map_err(|e| corrupt(format!("not a database image: {}", e)))?;

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![K::TABLE],
                |row| row.get(0),
            )
            .map_err(|e| corrupt(format!("unreadable image: {}", e)))?;
        if tables == 0 {
            return Err(corrupt(format!("image has no {} table", K::TABLE)));
        }

        conn.query_row(
            &format!("SELECT {} FROM {} LIMIT 1", schema::select_list::<K>(), K::TABLE),
            [],
            |_| Ok(()),
        )
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(()),
            e => Err(corrupt(format!("{} columns do not match: {}", K::TABLE, e))),
        })?;

        Ok(conn)
    }

    /// Persist a new record, returning its assigned id. Never updates an existing row.
    pub async fn save(&self, draft: &K::Draft, notes: Option<&str>) -> Result<i64> {
        let conn = self.ready().await?;
        let guard = conn.lock().await;

        let (id, image) = {
            let timestamp = now_timestamp();
            let notes = notes.map(str::trim).filter(|n| !n.is_empty());

            let mut values = Vec::with_capacity(K::COLUMNS.len() + 2);
            values.push(Value::Text(timestamp));
            values.extend(K::values(draft));
            values.push(notes.map_or(Value::Null, |n| Value::Text(n.to_string())));

            guard.execute(&schema::insert_statement::<K>(), params_from_iter(values))?;
            let id = guard.last_insert_rowid();
            (id, snapshot_image(&guard)?)
        };

        self.adapter.save(&image).await?;
        debug!(table = K::TABLE, id, "Record saved");
        Ok(id)
    }

    /// All records, newest timestamp first
    pub async fn get_all(&self) -> Result<Vec<K>> {
        self.select("", Vec::new(), None).await
    }

    /// The `limit` newest records
    pub async fn recent(&self, limit: usize) -> Result<Vec<K>> {
        self.select("", Vec::new(), Some(limit)).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<K>> {
        let mut rows = self
            .select("WHERE id = ?1", vec![Value::Integer(id)], None)
            .await?;
        Ok(rows.pop())
    }

    /// Remove a record if present. Deleting an unknown id is not an error.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let conn = self.ready().await?;
        let guard = conn.lock().await;

        let image = {
            let removed = guard.execute(
                &format!("DELETE FROM {} WHERE id = ?1", K::TABLE),
                params![id],
            )?;
            if removed == 0 {
                warn!(table = K::TABLE, id, "Delete of unknown record id");
            }
            snapshot_image(&guard)?
        };

        self.adapter.save(&image).await
    }

    /// Case-insensitive substring search over the kind's search columns.
    /// A blank term matches everything.
    pub async fn search(&self, term: &str) -> Result<Vec<K>> {
        let term = term.trim();
        if term.is_empty() {
            return self.get_all().await;
        }
        let clause = format!("WHERE {}", schema::search_predicate::<K>());
        self.select(&clause, vec![Value::Text(schema::like_pattern(term))], None)
            .await
    }

    /// Pretty-printed JSON array of every record, newest first
    pub async fn export_all(&self) -> Result<String> {
        let records = self.get_all().await?;
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Suggested export file name for `date`
    pub fn export_file_name(date: NaiveDate) -> String {
        format!("{}-{}.json", K::EXPORT_STEM, date.format("%Y-%m-%d"))
    }

    /// Remove every record. Ids are not reused afterwards.
    pub async fn clear(&self) -> Result<()> {
        let conn = self.ready().await?;
        let guard = conn.lock().await;

        let (removed, image) = {
            let removed = guard.execute(&format!("DELETE FROM {}", K::TABLE), [])?;
            (removed, snapshot_image(&guard)?)
        };

        self.adapter.save(&image).await?;
        info!("🧹 Cleared {} ({} records)", K::TABLE, removed);
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        self.read(|conn| {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", K::TABLE), [], |row| {
                row.get(0)
            })?)
        })
        .await
    }

    /// Select records matching `clause`, newest first
    pub(crate) async fn select(
        &self,
        clause: &str,
        params: Vec<Value>,
        limit: Option<usize>,
    ) -> Result<Vec<K>> {
        let mut sql = format!(
            "SELECT {} FROM {} {} ORDER BY timestamp DESC, id DESC",
            schema::select_list::<K>(),
            K::TABLE,
            clause
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        self.read(move |conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(params), K::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    /// Run a read-only closure against the ready connection
    pub(crate) async fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.ready().await?;
        let guard = conn.lock().await;
        f(&guard)
    }
}

/// ISO-8601 UTC with millisecond precision (`2026-10-16T09:30:00.000Z`)
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Full byte image of the main database
fn snapshot_image(conn: &Connection) -> Result<Vec<u8>> {
    Ok(conn.serialize(DatabaseName::Main)?.to_vec())
}

/// Copy `image` into an SQLite-owned buffer for `deserialize`
fn owned_data(image: &[u8]) -> Option<OwnedData> {
    // SAFETY: the buffer comes from sqlite3_malloc64 with exactly image.len() bytes,
    // is fully initialized by the copy, and ownership passes to OwnedData.
    unsafe {
        let raw = ffi::sqlite3_malloc64(image.len() as u64) as *mut u8;
        let ptr = NonNull::new(raw)?;
        std::ptr::copy_nonoverlapping(image.as_ptr(), ptr.as_ptr(), image.len());
        Some(OwnedData::from_raw_nonnull(ptr, image.len()))
    }
}
