//! Journal configuration
//!
//! Resolution order: built-in defaults, then `journal.toml` (or the file named
//! by `JOURNAL_CONFIG_PATH`), then environment variables. CLI flags win over all.

use crate::calculator::DEFAULT_STARTING_BALANCE;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Directory holding the snapshot slot files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Starting balance for margin calculations (USD)
    #[serde(default = "default_starting_balance")]
    pub starting_balance: f64,

    /// `tracing` filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./journal_data")
}

fn default_starting_balance() -> f64 {
    DEFAULT_STARTING_BALANCE
}

fn default_log_filter() -> String {
    "futures_journal=info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            starting_balance: default_starting_balance(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Defaults, optional TOML file, then environment overrides.
    /// A missing file is fine; a malformed one is an error.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let path = std::env::var("JOURNAL_CONFIG_PATH")
            .unwrap_or_else(|_| "journal.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            Self::load(&path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path);
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("JOURNAL_DATA_DIR") {
            if !dir.trim().is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(v) = std::env::var("JOURNAL_STARTING_BALANCE") {
            if let Ok(balance) = v.trim().parse::<f64>() {
                if balance.is_finite() && balance > 0.0 {
                    self.starting_balance = balance;
                }
            }
        }
        if let Ok(filter) = std::env::var("RUST_LOG") {
            self.log_filter = filter;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.starting_balance, 25_000.0);
        assert_eq!(config.data_dir, PathBuf::from("./journal_data"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.toml");
        std::fs::write(&path, "starting_balance = 50000.0\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.starting_balance, 50_000.0);
        assert_eq!(config.log_filter, "futures_journal=info");
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.toml");
        std::fs::write(&path, "starting_balance = \"lots\"").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.toml");
        let config = AppConfig {
            data_dir: PathBuf::from("/tmp/j"),
            starting_balance: 10_000.0,
            log_filter: "debug".to_string(),
        };
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }
}
