//! Record schema descriptors
//!
//! One [`RecordKind`] per table. The engine derives every statement from the
//! descriptor, so trade and tax stores share all CRUD, search and export logic.

use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Serialize, Serializer};

/// Describes how one record kind maps onto its table and slot
pub trait RecordKind: Serialize + Send + Sized + 'static {
    /// Transient calculation result this record is persisted from
    type Draft: Sync;

    /// Table name inside the store image
    const TABLE: &'static str;

    /// Durable slot key holding the store image
    const SLOT_KEY: &'static str;

    /// Export file name stem (`<stem>-<YYYY-MM-DD>.json`)
    const EXPORT_STEM: &'static str;

    /// `CREATE TABLE` statement. Must declare `id INTEGER PRIMARY KEY AUTOINCREMENT`,
    /// `timestamp TEXT NOT NULL`, every entry of [`Self::COLUMNS`], and `notes TEXT`.
    const SCHEMA: &'static str;

    /// Data columns between `timestamp` and `notes`, in persisted order
    const COLUMNS: &'static [&'static str];

    /// SQL expressions matched (OR'd) by search; numeric columns are cast to text
    const SEARCH_COLUMNS: &'static [&'static str];

    /// Values for [`Self::COLUMNS`], same order
    fn values(draft: &Self::Draft) -> Vec<Value>;

    /// Decode a row selected with [`select_list`]
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// `id, timestamp, <columns>, notes`
pub fn select_list<K: RecordKind>() -> String {
    let mut cols = Vec::with_capacity(K::COLUMNS.len() + 3);
    cols.push("id");
    cols.push("timestamp");
    cols.extend_from_slice(K::COLUMNS);
    cols.push("notes");
    cols.join(", ")
}

/// `INSERT INTO <table> (timestamp, <columns>, notes) VALUES (?1, ..., ?n)`
pub fn insert_statement<K: RecordKind>() -> String {
    let n = K::COLUMNS.len() + 2;
    let placeholders: Vec<String> = (1..=n).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} (timestamp, {}, notes) VALUES ({})",
        K::TABLE,
        K::COLUMNS.join(", "),
        placeholders.join(", ")
    )
}

/// Search predicate over [`RecordKind::SEARCH_COLUMNS`], bound to `?1`
pub fn search_predicate<K: RecordKind>() -> String {
    K::SEARCH_COLUMNS
        .iter()
        .map(|col| format!("{} LIKE ?1 ESCAPE '\\'", col))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Wrap a user term as a literal LIKE substring pattern
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Flags are persisted and exported as 0/1
pub fn bool_as_int<S: Serializer>(v: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(u8::from(*v))
}

/// Read a 0/1 column as a flag
pub fn flag(row: &Row<'_>, col: &str) -> rusqlite::Result<bool> {
    Ok(row.get::<_, i64>(col)? != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\x"), "%c:\\\\x%");
    }
}
