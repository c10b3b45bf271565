//! Configuration management for LedgerChain

use crate::error::{ChainError, Result};
use crate::transaction::{AccountId, Amount};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ledgerchain.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub verifier: VerifierConfig,
    #[serde(default)]
    pub demo: DemoConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct VerifierConfig {
    /// Reject blocks whose `txn_count` differs from the number of transactions they carry.
    #[serde(default)]
    pub strict_txn_count: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_block_size_limit")]
    pub block_size_limit: usize,
    #[serde(default = "default_txn_buffer_count")]
    pub txn_buffer_count: usize,
    #[serde(default = "default_max_transfer")]
    pub max_transfer: Amount,
    #[serde(default = "default_foreign_block_txns")]
    pub foreign_block_txns: usize,
    #[serde(default = "default_initial_balances")]
    pub initial_balances: BTreeMap<AccountId, Amount>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            block_size_limit: default_block_size_limit(),
            txn_buffer_count: default_txn_buffer_count(),
            max_transfer: default_max_transfer(),
            foreign_block_txns: default_foreign_block_txns(),
            initial_balances: default_initial_balances(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_block_size_limit() -> usize {
    10
}

fn default_txn_buffer_count() -> usize {
    200
}

fn default_max_transfer() -> Amount {
    10
}

fn default_foreign_block_txns() -> usize {
    5
}

fn default_initial_balances() -> BTreeMap<AccountId, Amount> {
    [("Alice", 50), ("Bob", 50), ("Micle", 100), ("Frank", 80)]
        .into_iter()
        .map(|(name, balance)| (name.to_string(), balance))
        .collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.demo.block_size_limit == 0 {
            return Err(ChainError::ConfigError("demo.block_size_limit must be positive".into()));
        }
        if self.demo.max_transfer <= 0 {
            return Err(ChainError::ConfigError("demo.max_transfer must be positive".into()));
        }
        if self.demo.initial_balances.len() < 2 {
            return Err(ChainError::ConfigError(
                "demo.initial_balances needs at least two accounts".into(),
            ));
        }
        if let Some((account, _)) = self.demo.initial_balances.iter().find(|(_, b)| **b < 0) {
            return Err(ChainError::ConfigError(format!(
                "demo.initial_balances.{} must not be negative",
                account
            )));
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(ChainError::ConfigError(format!(
                "logging.level '{}' is not a log level",
                self.logging.level
            )));
        }
        Ok(())
    }
}

/// Loads `path`, or [`DEFAULT_CONFIG_FILE`] when no path is given.
///
/// A missing default file yields the built-in defaults; a missing explicit
/// path is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let text = match path {
        Some(path) => fs::read_to_string(path)?,
        None => read_if_present(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    if text.trim().is_empty() {
        return Ok(Config::default());
    }
    Config::from_toml(&text)
}

/// Contents of `path`, or an empty string when it does not exist.
fn read_if_present(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.verifier.strict_txn_count);
        assert_eq!(config.demo.block_size_limit, 10);
        assert_eq!(config.demo.txn_buffer_count, 200);
        assert_eq!(config.demo.initial_balances.get("Micle"), Some(&100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml("[verifier]\nstrict_txn_count = true\n").unwrap();
        assert!(config.verifier.strict_txn_count);
        assert_eq!(config.demo.max_transfer, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            Config::from_toml("[demo]\nblock_size_limit = 0\n"),
            Err(ChainError::ConfigError(_))
        ));
        assert!(matches!(
            Config::from_toml("[demo]\ninitial_balances = { A = 5 }\n"),
            Err(ChainError::ConfigError(_))
        ));
        assert!(matches!(
            Config::from_toml("[demo]\ninitial_balances = { A = 5, B = -1 }\n"),
            Err(ChainError::ConfigError(_))
        ));
        assert!(matches!(
            Config::from_toml("[logging]\nlevel = \"loud\"\n"),
            Err(ChainError::ConfigError(_))
        ));
        assert!(matches!(Config::from_toml("demo = 3"), Err(ChainError::ConfigError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[demo]\ntxn_buffer_count = 12\n\n[logging]\nlevel = \"debug\"").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.demo.txn_buffer_count, 12);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(load_config(Some(missing.as_path())), Err(ChainError::IoError(_))));
    }

    #[test]
    fn test_only_a_missing_default_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_if_present(&dir.path().join("absent.toml")).unwrap(), "");

        let mut garbled = tempfile::NamedTempFile::new().unwrap();
        garbled.write_all(&[0xff, 0xfe, b'\n']).unwrap();
        assert!(matches!(read_if_present(garbled.path()), Err(ChainError::IoError(_))));
        assert!(matches!(read_if_present(dir.path()), Err(ChainError::IoError(_))));
    }
}
