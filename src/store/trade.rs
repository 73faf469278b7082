//! Trade (profit/loss) records
//! Mission: Journal every saved profit/loss calculation with the contract terms frozen at save time

use super::engine::RecordStore;
use super::schema::{self, RecordKind};
use crate::calculator::TradeCalculation;
use crate::contracts;
use crate::error::Result;
use rusqlite::types::Value;
use rusqlite::Row;
use serde::Serialize;

/// Persisted profit/loss calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub id: i64,
    pub timestamp: String,
    pub symbol: String,
    pub contract_name: String,
    pub entry_price: f64,
    pub exit_price: f64,
    pub num_contracts: f64,
    pub point_diff: f64,
    pub ticks: f64,
    pub profit_loss: f64,
    pub profit_loss_pct: f64,
    pub total_value: f64,
    pub margin_used: f64,
    pub starting_balance: f64,
    pub remaining_balance: f64,
    #[serde(serialize_with = "schema::bool_as_int")]
    pub is_profit: bool,
    pub tick_size: f64,
    pub tick_value: f64,
    pub contract_multiplier: f64,
    pub typical_margin: f64,
    pub notes: Option<String>,
}

impl RecordKind for TradeRecord {
    type Draft = TradeCalculation;

    const TABLE: &'static str = "profit_loss_calculations";
    const SLOT_KEY: &'static str = "profitLossDB";
    const EXPORT_STEM: &'static str = "profit-loss-history";

    const SCHEMA: &'static str = r#"
CREATE TABLE IF NOT EXISTS profit_loss_calculations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    symbol TEXT NOT NULL,
    contract_name TEXT NOT NULL,
    entry_price REAL NOT NULL,
    exit_price REAL NOT NULL,
    num_contracts REAL NOT NULL,
    point_diff REAL NOT NULL,
    ticks REAL NOT NULL,
    profit_loss REAL NOT NULL,
    profit_loss_pct REAL NOT NULL,
    total_value REAL NOT NULL,
    margin_used REAL NOT NULL,
    starting_balance REAL NOT NULL,
    remaining_balance REAL NOT NULL,
    is_profit INTEGER NOT NULL,
    tick_size REAL NOT NULL,
    tick_value REAL NOT NULL,
    contract_multiplier REAL NOT NULL,
    typical_margin REAL NOT NULL,
    notes TEXT
);
"#;

    const COLUMNS: &'static [&'static str] = &[
        "symbol",
        "contract_name",
        "entry_price",
        "exit_price",
        "num_contracts",
        "point_diff",
        "ticks",
        "profit_loss",
        "profit_loss_pct",
        "total_value",
        "margin_used",
        "starting_balance",
        "remaining_balance",
        "is_profit",
        "tick_size",
        "tick_value",
        "contract_multiplier",
        "typical_margin",
    ];

    const SEARCH_COLUMNS: &'static [&'static str] = &[
        "notes",
        "symbol",
        "CAST(profit_loss AS TEXT)",
        "CAST(entry_price AS TEXT)",
        "CAST(exit_price AS TEXT)",
    ];

    fn values(calc: &TradeCalculation) -> Vec<Value> {
        vec![
            Value::Text(calc.spec.symbol.to_string()),
            Value::Text(calc.spec.name.to_string()),
            Value::Real(calc.entry_price),
            Value::Real(calc.exit_price),
            Value::Real(calc.num_contracts),
            Value::Real(calc.point_diff),
            Value::Real(calc.ticks),
            Value::Real(calc.profit_loss),
            Value::Real(calc.profit_loss_pct),
            Value::Real(calc.total_value),
            Value::Real(calc.margin_used),
            Value::Real(calc.starting_balance),
            Value::Real(calc.remaining_balance),
            Value::Integer(i64::from(calc.is_profit)),
            Value::Real(calc.spec.tick_size),
            Value::Real(calc.spec.tick_value),
            Value::Real(calc.spec.contract_multiplier),
            Value::Real(calc.spec.typical_margin),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            timestamp: row.get("timestamp")?,
            symbol: row.get("symbol")?,
            contract_name: row.get("contract_name")?,
            entry_price: row.get("entry_price")?,
            exit_price: row.get("exit_price")?,
            num_contracts: row.get("num_contracts")?,
            point_diff: row.get("point_diff")?,
            ticks: row.get("ticks")?,
            profit_loss: row.get("profit_loss")?,
            profit_loss_pct: row.get("profit_loss_pct")?,
            total_value: row.get("total_value")?,
            margin_used: row.get("margin_used")?,
            starting_balance: row.get("starting_balance")?,
            remaining_balance: row.get("remaining_balance")?,
            is_profit: schema::flag(row, "is_profit")?,
            tick_size: row.get("tick_size")?,
            tick_value: row.get("tick_value")?,
            contract_multiplier: row.get("contract_multiplier")?,
            typical_margin: row.get("typical_margin")?,
            notes: row.get("notes")?,
        })
    }
}

/// Aggregate over every saved trade
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeStatistics {
    pub total_trades: i64,
    pub winning_trades: i64,
    pub losing_trades: i64,
    pub total_profit_loss: f64,
    pub avg_profit_loss: f64,
    pub max_profit: f64,
    /// Smallest profit/loss (most negative when any trade lost)
    pub max_loss: f64,
}

impl TradeStatistics {
    /// Winning share in percent
    pub fn win_rate(&self) -> f64 {
        if self.total_trades > 0 {
            self.winning_trades as f64 / self.total_trades as f64 * 100.0
        } else {
            0.0
        }
    }
}

pub type TradeStore = RecordStore<TradeRecord>;

impl RecordStore<TradeRecord> {
    /// Aggregate statistics, `None` when no trades are saved
    pub async fn statistics(&self) -> Result<Option<TradeStatistics>> {
        self.read(|conn| {
            let stats = conn.query_row(
                "SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN is_profit = 1 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN is_profit = 0 THEN 1 ELSE 0 END), 0),
                    SUM(profit_loss),
                    AVG(profit_loss),
                    MAX(profit_loss),
                    MIN(profit_loss)
                 FROM profit_loss_calculations",
                [],
                |row| {
                    let total_trades: i64 = row.get(0)?;
                    if total_trades == 0 {
                        return Ok(None);
                    }
                    Ok(Some(TradeStatistics {
                        total_trades,
                        winning_trades: row.get(1)?,
                        losing_trades: row.get(2)?,
                        total_profit_loss: row.get(3)?,
                        avg_profit_loss: row.get(4)?,
                        max_profit: row.get(5)?,
                        max_loss: row.get(6)?,
                    }))
                },
            )?;
            Ok(stats)
        })
        .await
    }

    /// Trades for one contract (`MES` or `/MES`), newest first
    pub async fn by_symbol(&self, symbol: &str) -> Result<Vec<TradeRecord>> {
        let symbol = match contracts::find(symbol) {
            Some(spec) => spec.symbol.to_string(),
            None => symbol.trim().to_string(),
        };
        self.select("WHERE symbol = ?1", vec![Value::Text(symbol)], None)
            .await
    }
}
