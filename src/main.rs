//! Futures Journal CLI
//!
//! Calculates futures profit/loss and Section 1256 tax, and manages the saved
//! calculation history.
//!
//! Usage:
//!   futures-journal specs
//!   futures-journal trade --symbol MES --entry 5800 --exit 5850 --contracts 2 --save --notes "ORB"
//!   futures-journal tax --amount 10000 --ca-state --save
//!   futures-journal list trades --limit 5
//!   futures-journal search taxes 10000
//!   futures-journal stats
//!   futures-journal export trades

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use futures_journal::calculator::{self, profit_loss, tax, TradeInput};
use futures_journal::config::AppConfig;
use futures_journal::contracts;
use futures_journal::store::{Journal, TaxStore, TradeStore};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "futures-journal")]
#[command(about = "Futures P&L and Section 1256 tax calculator with a persistent journal")]
struct Cli {
    /// Directory holding the journal snapshots (overrides config)
    #[arg(long, env = "JOURNAL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    Trades,
    Taxes,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List supported contract specifications
    Specs,

    /// Calculate profit/loss for a trade
    Trade {
        /// Contract key or symbol (unknown keys fall back to MES)
        #[arg(short, long, default_value = "MES")]
        symbol: String,

        /// Entry price (defaults to the contract's example entry)
        #[arg(long)]
        entry: Option<String>,

        /// Exit price (defaults to the contract's example exit)
        #[arg(long)]
        exit: Option<String>,

        #[arg(short, long, default_value = "1")]
        contracts: String,

        /// Starting balance (defaults to config)
        #[arg(long)]
        balance: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Save the result to the journal
        #[arg(long)]
        save: bool,
    },

    /// Estimate Section 1256 tax on a profit/loss amount
    Tax {
        #[arg(short, long, allow_hyphen_values = true)]
        amount: String,

        /// Include California state tax (13.3%)
        #[arg(long)]
        ca_state: bool,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        save: bool,
    },

    /// List saved calculations, newest first
    List {
        #[arg(value_enum)]
        kind: Kind,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Search saved calculations
    Search {
        #[arg(value_enum)]
        kind: Kind,

        term: String,
    },

    /// Aggregate trade statistics
    Stats,

    /// Net tax liability/benefit across saved tax calculations
    TaxSummary,

    /// Export saved calculations as JSON
    Export {
        #[arg(value_enum)]
        kind: Kind,

        /// Output file (defaults to `<kind>-<date>.json` in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete one saved calculation
    Delete {
        #[arg(value_enum)]
        kind: Kind,

        id: i64,
    },

    /// Delete every saved calculation of one kind
    Clear {
        #[arg(value_enum)]
        kind: Kind,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let journal = Journal::open_dir(&config.data_dir);

    match cli.command {
        Commands::Specs => print_json(&contracts::all())?,
        Commands::Trade {
            symbol,
            entry,
            exit,
            contracts: count,
            balance,
            notes,
            save,
        } => {
            let spec = contracts::lookup(&symbol);
            let input = TradeInput {
                entry_price: calculator::coerce_number(
                    entry.as_deref().unwrap_or(spec.default_entry),
                ),
                exit_price: calculator::coerce_number(
                    exit.as_deref().unwrap_or(spec.default_exit),
                ),
                num_contracts: calculator::coerce_number(&count),
                starting_balance: balance
                    .as_deref()
                    .map(calculator::coerce_balance)
                    .unwrap_or(config.starting_balance),
            };
            let calc = profit_loss::calculate(input, spec);
            print_json(&calc)?;

            if save {
                let id = journal.trades.save(&calc, notes.as_deref()).await?;
                info!("✅ Saved trade #{}", id);
            }
        }
        Commands::Tax {
            amount,
            ca_state,
            notes,
            save,
        } => match tax::calculate(calculator::coerce_number(&amount), ca_state) {
            Some(calc) => {
                print_json(&calc)?;
                if save {
                    let id = journal.taxes.save(&calc, notes.as_deref()).await?;
                    info!("✅ Saved tax calculation #{}", id);
                }
            }
            None => println!("Amount is zero; nothing to calculate"),
        },
        Commands::List { kind, limit } => match (kind, limit) {
            (Kind::Trades, Some(n)) => print_json(&journal.trades.recent(n).await?)?,
            (Kind::Trades, None) => print_json(&journal.trades.get_all().await?)?,
            (Kind::Taxes, Some(n)) => print_json(&journal.taxes.recent(n).await?)?,
            (Kind::Taxes, None) => print_json(&journal.taxes.get_all().await?)?,
        },
        Commands::Search { kind, term } => match kind {
            Kind::Trades => print_json(&journal.trades.search(&term).await?)?,
            Kind::Taxes => print_json(&journal.taxes.search(&term).await?)?,
        },
        Commands::Stats => match journal.trades.statistics().await? {
            Some(stats) => {
                print_json(&stats)?;
                println!("Win rate: {:.1}%", stats.win_rate());
            }
            None => println!("No saved trades"),
        },
        Commands::TaxSummary => print_json(&journal.taxes.summary().await?)?,
        Commands::Export { kind, output } => {
            let today = Utc::now().date_naive();
            let (text, default_name) = match kind {
                Kind::Trades => (
                    journal.trades.export_all().await?,
                    TradeStore::export_file_name(today),
                ),
                Kind::Taxes => (
                    journal.taxes.export_all().await?,
                    TaxStore::export_file_name(today),
                ),
            };
            let path = output.unwrap_or_else(|| PathBuf::from(default_name));
            std::fs::write(&path, text)
                .with_context(|| format!("Failed to write export {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        Commands::Delete { kind, id } => {
            match kind {
                Kind::Trades => journal.trades.delete(id).await?,
                Kind::Taxes => journal.taxes.delete(id).await?,
            }
            println!("Deleted {:?} #{}", kind, id);
        }
        Commands::Clear { kind } => {
            match kind {
                Kind::Trades => journal.trades.clear().await?,
                Kind::Taxes => journal.taxes.clear().await?,
            }
            println!("Cleared {:?}", kind);
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
