//! LedgerChain - the consensus-free core of an account-balance blockchain
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Blockchain
//! - [`blockchain`] - Ledger state, block building and chain verification
//! - [`transaction`] - Transaction type and validity rules
//!
//! ## Cryptography
//! - [`crypto`] - Canonical fingerprints (SHA-256 over sorted-key JSON)
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! Every operation is pure: states and blocks are snapshots, and verification
//! derives a new [`blockchain::LedgerState`] instead of mutating anything.

#![forbid(unsafe_code)]

// ============================================================================
// Core Blockchain
// ============================================================================
pub mod blockchain;
pub mod transaction;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;

pub use blockchain::{
    apply, check_chain, check_chain_json, check_chains, check_hash, check_validity, make_block,
    Block, BlockContents, Chain, LedgerState, Verifier,
};
pub use crypto::{fingerprint, Fingerprint};
pub use error::{ChainError, Result};
pub use transaction::{is_valid, AccountId, Amount, Transaction, TxRejection};
