// Thin re-export module: implementation is in `blockchain/core.rs`, split into
// block building, ledger state and verification.

pub mod core;
pub use core::*;
