//! Error types for LedgerChain

use crate::transaction::{Transaction, TxRejection};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Hash does not match contents of block {0}")]
    HashMismatch(u64),
    #[error("Invalid transaction in block {block_number}: {txn} ({reason})")]
    InvalidTransaction {
        block_number: u64,
        txn: Transaction,
        reason: TxRejection,
    },
    #[error("Block number {0} does not follow its parent")]
    BadBlockNumber(u64),
    #[error("Parent hash not accurate at block {0}")]
    BadParentHash(u64),
    #[error("Block {block_number} declares {declared} transactions but carries {actual}")]
    TxnCountMismatch {
        block_number: u64,
        declared: usize,
        actual: usize,
    },
    #[error("Malformed chain: {0}")]
    MalformedChain(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl ChainError {
    /// Number of the block the failure was detected in, when there is one.
    pub fn block_number(&self) -> Option<u64> {
        match self {
            ChainError::HashMismatch(n)
            | ChainError::BadBlockNumber(n)
            | ChainError::BadParentHash(n) => Some(*n),
            ChainError::InvalidTransaction { block_number, .. }
            | ChainError::TxnCountMismatch { block_number, .. } => Some(*block_number),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
