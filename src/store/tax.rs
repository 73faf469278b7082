//! Tax records

use super::engine::RecordStore;
use super::schema::{self, RecordKind};
use crate::calculator::TaxCalculation;
use crate::error::Result;
use rusqlite::types::Value;
use rusqlite::Row;
use serde::Serialize;

/// Persisted Section 1256 tax calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxRecord {
    pub id: i64,
    pub timestamp: String,
    pub amount: f64,
    #[serde(serialize_with = "schema::bool_as_int")]
    pub is_profit: bool,
    #[serde(serialize_with = "schema::bool_as_int")]
    pub include_ca_state: bool,
    pub long_term_portion: f64,
    pub short_term_portion: f64,
    pub long_term_tax: f64,
    pub short_term_tax: f64,
    pub total_federal_tax: f64,
    pub ca_state_tax: f64,
    pub total_tax: f64,
    pub effective_rate: f64,
    pub federal_effective_rate: f64,
    pub state_effective_rate: f64,
    pub after_tax: f64,
    pub notes: Option<String>,
}

impl RecordKind for TaxRecord {
    type Draft = TaxCalculation;

    const TABLE: &'static str = "tax_calculations";
    const SLOT_KEY: &'static str = "taxCalculatorDB";
    const EXPORT_STEM: &'static str = "tax-calculations";

    const SCHEMA: &'static str = r#"
CREATE TABLE IF NOT EXISTS tax_calculations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    amount REAL NOT NULL,
    is_profit INTEGER NOT NULL,
    include_ca_state INTEGER NOT NULL,
    long_term_portion REAL NOT NULL,
    short_term_portion REAL NOT NULL,
    long_term_tax REAL NOT NULL,
    short_term_tax REAL NOT NULL,
    total_federal_tax REAL NOT NULL,
    ca_state_tax REAL NOT NULL,
    total_tax REAL NOT NULL,
    effective_rate REAL NOT NULL,
    federal_effective_rate REAL NOT NULL,
    state_effective_rate REAL NOT NULL,
    after_tax REAL NOT NULL,
    notes TEXT
);
"#;

    const COLUMNS: &'static [&'static str] = &[
        "amount",
        "is_profit",
        "include_ca_state",
        "long_term_portion",
        "short_term_portion",
        "long_term_tax",
        "short_term_tax",
        "total_federal_tax",
        "ca_state_tax",
        "total_tax",
        "effective_rate",
        "federal_effective_rate",
        "state_effective_rate",
        "after_tax",
    ];

    const SEARCH_COLUMNS: &'static [&'static str] = &["notes", "CAST(amount AS TEXT)"];

    fn values(calc: &TaxCalculation) -> Vec<Value> {
        vec![
            Value::Real(calc.amount),
            Value::Integer(i64::from(calc.is_profit)),
            Value::Integer(i64::from(calc.include_ca_state)),
            Value::Real(calc.long_term_portion),
            Value::Real(calc.short_term_portion),
            Value::Real(calc.long_term_tax),
            Value::Real(calc.short_term_tax),
            Value::Real(calc.total_federal_tax),
            Value::Real(calc.ca_state_tax),
            Value::Real(calc.total_tax),
            Value::Real(calc.effective_rate),
            Value::Real(calc.federal_effective_rate),
            Value::Real(calc.state_effective_rate),
            Value::Real(calc.after_tax),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            timestamp: row.get("timestamp")?,
            amount: row.get("amount")?,
            is_profit: schema::flag(row, "is_profit")?,
            include_ca_state: schema::flag(row, "include_ca_state")?,
            long_term_portion: row.get("long_term_portion")?,
            short_term_portion: row.get("short_term_portion")?,
            long_term_tax: row.get("long_term_tax")?,
            short_term_tax: row.get("short_term_tax")?,
            total_federal_tax: row.get("total_federal_tax")?,
            ca_state_tax: row.get("ca_state_tax")?,
            total_tax: row.get("total_tax")?,
            effective_rate: row.get("effective_rate")?,
            federal_effective_rate: row.get("federal_effective_rate")?,
            state_effective_rate: row.get("state_effective_rate")?,
            after_tax: row.get("after_tax")?,
            notes: row.get("notes")?,
        })
    }
}

/// Net tax position across saved calculations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxSummary {
    /// Tax owed on profitable calculations
    pub total_liability: f64,
    /// Absolute tax saved on losing calculations
    pub total_benefit: f64,
    pub net_tax: f64,
    pub calculation_count: i64,
}

pub type TaxStore = RecordStore<TaxRecord>;

impl RecordStore<TaxRecord> {
    /// Liability/benefit totals; all zero on an empty store
    pub async fn summary(&self) -> Result<TaxSummary> {
        self.read(|conn| {
            let summary = conn.query_row(
                "SELECT
                    COALESCE(SUM(CASE WHEN is_profit = 1 THEN total_tax ELSE 0 END), 0.0),
                    COALESCE(SUM(CASE WHEN is_profit = 0 THEN ABS(total_tax) ELSE 0 END), 0.0),
                    COUNT(*)
                 FROM tax_calculations",
                [],
                |row| {
                    let total_liability: f64 = row.get(0)?;
                    let total_benefit: f64 = row.get(1)?;
                    Ok(TaxSummary {
                        total_liability,
                        total_benefit,
                        net_tax: total_liability - total_benefit,
                        calculation_count: row.get(2)?,
                    })
                },
            )?;
            Ok(summary)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::tax::calculate;
    use crate::snapshot::MemorySlot;
    use std::sync::Arc;

    fn store() -> TaxStore {
        TaxStore::new(Arc::new(MemorySlot::new()))
    }

    #[tokio::test]
    async fn test_save_and_get_by_id() {
        let store = store();
        let calc = calculate(10_000.0, true).unwrap();
        let id = store.save(&calc, Some("Q3 estimate")).await.unwrap();

        let rec = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(rec.id, id);
        assert_eq!(rec.amount, calc.amount);
        assert!(rec.is_profit);
        assert!(rec.include_ca_state);
        assert_eq!(rec.long_term_portion, calc.long_term_portion);
        assert_eq!(rec.short_term_portion, calc.short_term_portion);
        assert_eq!(rec.long_term_tax, calc.long_term_tax);
        assert_eq!(rec.short_term_tax, calc.short_term_tax);
        assert_eq!(rec.total_federal_tax, calc.total_federal_tax);
        assert_eq!(rec.ca_state_tax, calc.ca_state_tax);
        assert_eq!(rec.total_tax, calc.total_tax);
        assert_eq!(rec.effective_rate, calc.effective_rate);
        assert_eq!(rec.federal_effective_rate, calc.federal_effective_rate);
        assert_eq!(rec.state_effective_rate, calc.state_effective_rate);
        assert_eq!(rec.after_tax, calc.after_tax);
        assert_eq!(rec.notes.as_deref(), Some("Q3 estimate"));
    }

    #[tokio::test]
    async fn test_search_notes_and_amount() {
        let store = store();
        let a = store
            .save(&calculate(12_345.0, false).unwrap(), Some("Futures gains"))
            .await
            .unwrap();
        let b = store
            .save(&calculate(-800.0, false).unwrap(), None)
            .await
            .unwrap();

        let found = store.search("FUTURES").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, a);

        let found = store.search("-800").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, b);
    }

    #[tokio::test]
    async fn test_summary() {
        let store = store();
        let empty = store.summary().await.unwrap();
        assert_eq!(empty.calculation_count, 0);
        assert_eq!(empty.net_tax, 0.0);

        let gain = calculate(10_000.0, false).unwrap();
        let loss = calculate(-5_000.0, false).unwrap();
        store.save(&gain, None).await.unwrap();
        store.save(&loss, None).await.unwrap();

        let s = store.summary().await.unwrap();
        assert_eq!(s.calculation_count, 2);
        assert!((s.total_liability - 2720.0).abs() < 1e-6);
        assert!((s.total_benefit - 1360.0).abs() < 1e-6);
        assert!((s.net_tax - 1360.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_export_flags_are_integers() {
        let store = store();
        store
            .save(&calculate(250.0, true).unwrap(), None)
            .await
            .unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&store.export_all().await.unwrap()).unwrap();
        let row = &parsed[0];
        assert_eq!(row["is_profit"], 1);
        assert_eq!(row["include_ca_state"], 1);
        assert!(row["notes"].is_null());
        assert_eq!(row["amount"], 250.0);
    }
}
